//! Core hide-and-seek world
//!
//! This module contains the grid, the agents, layout generation and the
//! line-of-sight rule, without any learning, I/O or rendering.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;
pub mod visibility;

// Re-export commonly used types
pub use action::Action;
pub use config::{ConfigError, GameConfig, MAX_GRID_SIZE};
pub use engine::{GameEngine, PlacementError, create_grid, place_entity, place_static_objects};
pub use state::{Cell, Entity, GameState, Grid, Position, Role};
pub use visibility::in_line_of_sight;
