//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

use crate::game::ConfigError;

/// Hyperparameters shared by both agents' tabular Q-learning
///
/// # Example
///
/// ```rust
/// use hide_seek::rl::QLearningConfig;
///
/// let config = QLearningConfig {
///     epsilon: 0.3,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate: how far each update moves toward its target
    ///
    /// Default: 0.1
    pub alpha: f64,

    /// Discount factor for the best next-state value
    ///
    /// Default: 0.9
    pub gamma: f64,

    /// Probability of a uniformly random action while training
    ///
    /// Playback always acts greedily regardless of this value.
    ///
    /// Default: 0.2
    pub epsilon: f64,
}

impl QLearningConfig {
    pub fn new(alpha: f64, gamma: f64, epsilon: f64) -> Self {
        Self {
            alpha,
            gamma,
            epsilon,
        }
    }

    /// Checks that every rate lies in [0, 1]
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("epsilon", self.epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.2,
        }
    }
}
