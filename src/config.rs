//! Scheduler configuration, read from a TOML file.
//!
//! ```toml
//! database_path = "db.sqlite3"
//! policy = "reset-on-hesitant-pass"   # or "classic"
//! initial_ease_factor = 2.5
//! ```

use crate::error::{Result, SchedulerError};
use crate::models::ReviewPolicy;
use crate::models::scheduling_state::{INITIAL_EASE_FACTOR, validate_ease_factor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database_path: PathBuf,
    pub policy: ReviewPolicy,
    pub initial_ease_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("db.sqlite3"),
            policy: ReviewPolicy::default(),
            initial_ease_factor: INITIAL_EASE_FACTOR,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        validate_ease_factor(config.initial_ease_factor)
            .map_err(|e| SchedulerError::Config(format!("initial_ease_factor: {}", e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
database_path = "/tmp/cards.sqlite3"
policy = "classic"
initial_ease_factor = 2.3
"#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/cards.sqlite3"));
        assert_eq!(config.policy, ReviewPolicy::Classic);
        assert_eq!(config.initial_ease_factor, 2.3);
    }

    #[test]
    fn test_policy_names() {
        let config = Config::from_toml(r#"policy = "reset-on-hesitant-pass""#).unwrap();
        assert_eq!(config.policy, ReviewPolicy::ResetOnHesitantPass);
        assert!(Config::from_toml(r#"policy = "lenient""#).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml("initial_ease_factor = 1.0"),
            Err(SchedulerError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("unknown_key = 1"),
            Err(SchedulerError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("sm2.toml")).unwrap();
        assert_eq!(config, Config::default());

        let path = dir.path().join("present.toml");
        fs::write(&path, "policy = \"classic\"\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().policy, ReviewPolicy::Classic);
    }
}
