use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration rejected before any episode is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },

    #[error("{name} must be at most {max}, got {value}")]
    TooLarge {
        name: &'static str,
        max: usize,
        value: usize,
    },

    #[error("{name} must be in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },

    #[error("training needs epsilon above 0; greedy play is for playback only")]
    NoExploration,

    #[error("{walls} walls and 2 agents do not fit in a {size}x{size} grid")]
    GridOverCapacity { walls: usize, size: usize },
}

/// Largest accepted grid side; keeps every coordinate and cell count in range
pub const MAX_GRID_SIZE: usize = 1024;

/// Layout and episode-length settings for the hide-and-seek grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Number of walls scattered at random each episode
    pub num_walls: usize,
    /// Turns before an episode is truncated
    pub max_steps: usize,
    /// Clamp bound applied to each axis of the relative-position state
    pub state_bound: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 6,
            num_walls: 10,
            max_steps: 100,
            state_bound: 4,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size and wall count
    pub fn new(grid_size: usize, num_walls: usize) -> Self {
        Self {
            grid_size,
            num_walls,
            ..Default::default()
        }
    }

    /// An open grid with no walls
    pub fn open(grid_size: usize) -> Self {
        Self::new(grid_size, 0)
    }

    /// Total number of cells in the grid
    pub fn cell_count(&self) -> usize {
        self.grid_size.saturating_mul(self.grid_size)
    }

    /// Largest coordinate difference two cells can have on one axis
    pub fn max_delta(&self) -> i32 {
        i32::try_from(self.grid_size.saturating_sub(1)).unwrap_or(i32::MAX)
    }

    /// Check that a layout can always be generated and episodes can run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::TooSmall {
                name: "grid_size",
                min: 1,
                value: 0,
            });
        }

        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::TooLarge {
                name: "grid_size",
                max: MAX_GRID_SIZE,
                value: self.grid_size,
            });
        }

        // Both agents need a free cell after the walls go down.
        let needed = self.num_walls.checked_add(2);
        if needed.is_none_or(|needed| needed > self.cell_count()) {
            return Err(ConfigError::GridOverCapacity {
                walls: self.num_walls,
                size: self.grid_size,
            });
        }

        if self.max_steps == 0 {
            return Err(ConfigError::TooSmall {
                name: "max_steps",
                min: 1,
                value: 0,
            });
        }

        if self.state_bound < 1 {
            return Err(ConfigError::TooSmall {
                name: "state_bound",
                min: 1,
                value: self.state_bound.max(0) as usize,
            });
        }

        Ok(())
    }
}
