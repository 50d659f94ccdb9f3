//! Optional JSON settings file
//!
//! Any subset of fields may be given; everything else keeps its default.
//!
//! ```json
//! {
//!   "training": {
//!     "num_episodes": 50000,
//!     "game_config": { "grid_size": 8, "num_walls": 14 },
//!     "learning_config": { "epsilon": 0.1 }
//!   },
//!   "playback": { "fps": 10 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::modes::{PlaybackConfig, TrainConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub training: TrainConfig,
    pub playback: PlaybackConfig,
}

impl Settings {
    /// Read settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings in {:?}", path))?;
        Ok(settings)
    }
}
