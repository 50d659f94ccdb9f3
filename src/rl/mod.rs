//! Independent tabular Q-learning for the seeker and the hider
//!
//! Provides:
//! - Relative-position state abstraction
//! - Per-agent Q-tables with epsilon-greedy selection and Bellman updates
//! - The per-turn episode protocol and reward shaping
//! - JSON persistence for trained tables

pub mod config;
pub mod episode;
pub mod observation;
pub mod persistence;
pub mod q_table;

pub use config::QLearningConfig;
pub use episode::{Episode, EpisodeStatus, EpisodeSummary, Transition, TurnResult, learn};
pub use observation::{StateKey, observe};
pub use persistence::{ModelMetadata, load_policies, save_policies};
pub use q_table::{Policies, QEntry, QTable};
