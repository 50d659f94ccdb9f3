//! Hide & Seek - seeker and hider agents trained with independent Q-learning
//!
//! This library provides:
//! - Grid, agents, layout generation and line of sight (game module)
//! - State abstraction, Q-tables and the episode protocol (rl module)
//! - Training statistics and playback counters (metrics module)
//! - Training, greedy playback and TUI visualization (modes module)
//! - Terminal rendering and key handling (render, input modules)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
pub mod settings;
