//! Config - Everything tunable about a game, loadable from JSON

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game_server::input::InputBindings;
use crate::game_server::leaderboard::LeaderboardConfig;
use crate::game_server::runner::PlayerConfig;
use crate::game_server::spawner::TrackConfig;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "RUNNER_CONFIG";

/// Complete game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player: PlayerConfig,
    pub track: TrackConfig,
    pub leaderboard: LeaderboardConfig,
    pub input: InputBindings,
}

/// Config loading errors
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl GameConfig {
    /// Parse a JSON config; missing sections and fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from the file named by `RUNNER_CONFIG`, or defaults
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("{} ({}); using defaults", e, path);
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::input::InputAction;
    use crate::game_server::leaderboard::BackendKind;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json(
            r#"{
                "player": { "maximum_speed": 12.0 },
                "track": { "seed": 7, "minimum_straight_tiles": 2 },
                "leaderboard": { "backend": "local" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.player.maximum_speed, 12.0);
        assert_eq!(config.player.initial_speed, 4.0);
        assert_eq!(config.track.seed, Some(7));
        assert_eq!(config.track.minimum_straight_tiles, 2);
        assert_eq!(config.track.maximum_straight_tiles, 15);
        assert_eq!(config.track.catalog.turn_tiles.len(), 3);
        assert_eq!(config.leaderboard.backend, BackendKind::Local);
        assert_eq!(config.input.resolve("Space"), Some(InputAction::Jump));
    }

    #[test]
    fn load_from_file_round_trips() {
        let mut config = GameConfig::default();
        config.leaderboard.player_name = "ana".to_string();
        config.track.seed = Some(99);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json_pretty().unwrap().as_bytes()).unwrap();

        let loaded = GameConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid config"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
