//! Saving and loading trained Q-tables
//!
//! Both tables go to one JSON file; training information goes beside it in
//! `<path>.meta.json`, the same way a model's weights and metadata are kept
//! apart.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Policies, QLearningConfig};
use crate::game::GameConfig;

/// Metadata saved with the tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Layout settings the tables were trained on
    pub game_config: GameConfig,

    /// Learning rates used during training
    pub learning_config: QLearningConfig,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Total turns across all training episodes
    pub training_steps: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    pub fn new(
        game_config: GameConfig,
        learning_config: QLearningConfig,
        episodes_trained: usize,
        training_steps: usize,
    ) -> Self {
        Self {
            game_config,
            learning_config,
            episodes_trained,
            training_steps,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Where the metadata for tables stored at `path` lives
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save both tables and their metadata, creating parent directories
pub fn save_policies(policies: &Policies, metadata: &ModelMetadata, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let tables = serde_json::to_string(policies).context("Failed to serialize Q-tables")?;
    std::fs::write(path, tables)
        .with_context(|| format!("Failed to write Q-tables to {:?}", path))?;

    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load tables previously written by [`save_policies`]
pub fn load_policies(path: &Path) -> Result<(Policies, ModelMetadata)> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    let tables = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Q-tables from {:?}", path))?;
    let policies: Policies =
        serde_json::from_str(&tables).context("Failed to deserialize Q-tables")?;

    Ok((policies, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Action;
    use crate::rl::StateKey;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_creation() {
        let metadata =
            ModelMetadata::new(GameConfig::default(), QLearningConfig::default(), 100, 2500);

        assert_eq!(metadata.game_config.grid_size, 6);
        assert_eq!(metadata.episodes_trained, 100);
        assert_eq!(metadata.training_steps, 2500);
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(
            metadata_path(Path::new("models/policies.json")),
            PathBuf::from("models/policies.meta.json")
        );
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("policies.json");

        let mut policies = Policies::new();
        policies.seeker.set(StateKey::new(1, 0), Action::Right, 12.5);
        policies.hider.set(StateKey::new(-1, 0), Action::Left, -3.0);
        let metadata = ModelMetadata::new(GameConfig::new(8, 4), QLearningConfig::default(), 7, 70);

        save_policies(&policies, &metadata, &path).unwrap();
        assert!(path.exists());
        assert!(metadata_path(&path).exists());

        let (loaded, loaded_meta) = load_policies(&path).unwrap();
        assert_eq!(loaded, policies);
        assert_eq!(loaded_meta, metadata);
    }

    #[test]
    fn test_trained_values_reload_exactly() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("policies.json");

        // repeated 0.1 / 0.9 updates leave values with no short decimal form
        let mut policies = Policies::new();
        let states = [StateKey::new(-4, -1), StateKey::new(-4, -3), StateKey::new(2, 0)];
        for round in 0..40 {
            for (i, &state) in states.iter().enumerate() {
                let next = states[(i + round) % states.len()];
                for action in Action::ALL {
                    let reward = if action == Action::Stay { -5.0 } else { -1.0 };
                    policies.seeker.update(state, action, reward, next, 0.1, 0.9);
                    policies.hider.update(state, action, -reward, next, 0.1, 0.9);
                }
            }
        }
        let metadata = ModelMetadata::new(GameConfig::default(), QLearningConfig::default(), 1, 1);

        save_policies(&policies, &metadata, &path).unwrap();
        let (loaded, _) = load_policies(&path).unwrap();

        for (saved, reloaded) in policies.seeker.entries().iter().zip(loaded.seeker.entries()) {
            assert_eq!(saved.value.to_bits(), reloaded.value.to_bits());
        }
        assert_eq!(loaded, policies);
        for &state in &states {
            assert_eq!(loaded.seeker.best_action(state), policies.seeker.best_action(state));
            assert_eq!(loaded.hider.best_action(state), policies.hider.best_action(state));
        }
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_policies(&temp_dir.path().join("missing.json"));
        assert!(result.is_err());
    }
}
