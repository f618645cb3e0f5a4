/// Spawner configuration, loaded from RON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::naming::DEFAULT_ITEM_PREFIX;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Prefix every item asset name must carry.
    pub item_prefix: String,
    /// Scenes that never resolve spawns (menus, loaders).
    pub non_game_scenes: Vec<String>,
    /// Extension of spawn files picked up when loading a directory.
    pub spawn_file_extension: String,
    /// Applied to every declared spawn chance.
    pub chance_multiplier: f32,
    /// Applied on top of `chance_multiplier` for directives with that tag.
    pub tag_multipliers: HashMap<String, f32>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            item_prefix: DEFAULT_ITEM_PREFIX.to_string(),
            non_game_scenes: vec![
                "MainMenu".to_string(),
                "Boot".to_string(),
                "Empty".to_string(),
            ],
            spawn_file_extension: "txt".to_string(),
            chance_multiplier: 1.0,
            tag_multipliers: HashMap::new(),
        }
    }
}

impl SpawnerConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<SpawnerConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string. Missing fields keep their
    /// defaults.
    pub fn parse_ron(input: &str) -> Result<SpawnerConfig, ConfigError> {
        let mut config: SpawnerConfig = ron::from_str(input)?;
        // Tags are matched against lowercased spawn files.
        config.tag_multipliers = config
            .tag_multipliers
            .into_iter()
            .map(|(tag, multiplier)| (tag.to_lowercase(), multiplier))
            .collect();
        Ok(config)
    }
}
