//! Training mode for the seeker and hider Q-tables
//!
//! Runs a fixed number of episodes back to back, each on a freshly generated
//! layout, updating both tables after every turn. Progress is logged every
//! `log_frequency` episodes and checkpoints are written every
//! `checkpoint_frequency` episodes when a save path is configured.
//!
//! # Example
//!
//! ```rust,no_run
//! use hide_seek::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(30_000, Some(PathBuf::from("models/policies.json")));
//! let mut train_mode = TrainMode::new(config)?;
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::game::{ConfigError, GameConfig, GameEngine};
use crate::metrics::TrainingStats;
use crate::rl::{
    Episode, EpisodeSummary, ModelMetadata, Policies, QLearningConfig, save_policies,
};

/// Configuration for training mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Number of episodes to train; the only stopping criterion
    pub num_episodes: usize,

    /// Where to save the final tables, if anywhere
    pub save_path: Option<PathBuf>,

    /// Save a checkpoint every N episodes (0 disables)
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes (0 disables)
    pub log_frequency: usize,

    /// Seed for layouts and exploration; entropy when absent
    pub seed: Option<u64>,

    /// Layout and episode-length settings
    pub game_config: GameConfig,

    /// Q-learning hyperparameters
    pub learning_config: QLearningConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            num_episodes: 30_000,
            save_path: None,
            checkpoint_frequency: 10_000,
            log_frequency: 1_000,
            seed: None,
            game_config: GameConfig::default(),
            learning_config: QLearningConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Create a new training configuration with defaults
    pub fn new(num_episodes: usize, save_path: Option<PathBuf>) -> Self {
        Self {
            num_episodes,
            save_path,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game_config.validate()?;
        self.learning_config.validate()?;
        if self.learning_config.epsilon == 0.0 {
            return Err(ConfigError::NoExploration);
        }
        Ok(())
    }
}

/// Training mode: owns both tables for the lifetime of the run
pub struct TrainMode {
    /// Layout generator and the run's random source
    engine: GameEngine,

    /// Seeker and hider tables being trained
    policies: Policies,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Current episode number
    current_episode: usize,
}

impl TrainMode {
    /// Create a training run starting from empty tables
    pub fn new(config: TrainConfig) -> Result<Self> {
        Self::with_policies(config, Policies::new())
    }

    /// Continue training from existing tables
    pub fn with_policies(config: TrainConfig, policies: Policies) -> Result<Self> {
        config.validate().context("Invalid training configuration")?;

        let engine = GameEngine::seeded(config.game_config.clone(), config.seed);

        // 100-episode rolling window
        let stats = TrainingStats::new(100);

        Ok(Self {
            engine,
            policies,
            stats,
            config,
            current_episode: 0,
        })
    }

    /// Run the training loop
    pub fn run(&mut self) -> Result<()> {
        self.log_header();

        for episode in 0..self.config.num_episodes {
            self.current_episode = episode;

            let summary = self.run_episode()?;
            self.stats.record_summary(&summary);

            if is_due(episode + 1, self.config.log_frequency) {
                info!(
                    "[Episode {}/{}] {}",
                    episode + 1,
                    self.config.num_episodes,
                    self.stats.format_summary()
                );
            }

            if is_due(episode + 1, self.config.checkpoint_frequency) {
                self.save_checkpoint()?;
            }
        }

        self.save_model()?;

        info!("Training complete: {}", self.stats.format_summary());
        info!(
            seeker_entries = self.policies.seeker.len(),
            hider_entries = self.policies.hider.len(),
            "final table sizes"
        );

        Ok(())
    }

    /// Run a single training episode on a fresh layout
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let layout = self.engine.reset().context("Failed to generate layout")?;
        let mut episode = Episode::new(layout, &self.config.game_config);
        Ok(episode.run_training(
            &mut self.policies,
            &self.config.learning_config,
            self.engine.rng(),
        ))
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    /// Hand the trained tables over, e.g. to playback
    pub fn into_policies(self) -> Policies {
        self.policies
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Metadata describing the tables as trained so far
    pub fn metadata(&self) -> ModelMetadata {
        ModelMetadata::new(
            self.config.game_config.clone(),
            self.config.learning_config.clone(),
            self.stats.total_episodes(),
            self.stats.total_steps(),
        )
    }

    /// Save a checkpoint next to the final save path
    fn save_checkpoint(&self) -> Result<()> {
        let Some(save_path) = &self.config.save_path else {
            return Ok(());
        };

        let checkpoint_path = save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.json", self.current_episode + 1));

        save_policies(&self.policies, &self.metadata(), &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        info!("Checkpoint saved: {:?}", checkpoint_path);

        Ok(())
    }

    /// Save the final trained tables
    fn save_model(&self) -> Result<()> {
        let Some(save_path) = &self.config.save_path else {
            debug!("No save path configured; tables stay in memory");
            return Ok(());
        };

        save_policies(&self.policies, &self.metadata(), save_path)
            .with_context(|| format!("Failed to save final tables to {:?}", save_path))?;

        info!("Final tables saved to: {:?}", save_path);

        Ok(())
    }

    fn log_header(&self) {
        let game = &self.config.game_config;
        let learning = &self.config.learning_config;

        info!(
            episodes = self.config.num_episodes,
            grid = %format!("{}x{}", game.grid_size, game.grid_size),
            walls = game.num_walls,
            max_steps = game.max_steps,
            state_bound = game.state_bound,
            "Q-learning training - hide and seek"
        );
        info!(
            alpha = learning.alpha,
            gamma = learning.gamma,
            epsilon = learning.epsilon,
            seed = ?self.config.seed,
            "hyperparameters"
        );
        if game.state_bound < game.max_delta() {
            debug!(
                "state bound {} is below the grid's largest offset {}; far positions share states",
                game.state_bound,
                game.max_delta()
            );
        }
    }
}

fn is_due(count: usize, frequency: usize) -> bool {
    frequency > 0 && count % frequency == 0
}
