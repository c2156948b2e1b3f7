//! Configuration management for fuellog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fuellog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fuellog.db";

/// Environment variable prefix.
const ENV_PREFIX: &str = "FUELLOG_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FUELLOG_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/fuellog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Trip workflow configuration.
    pub workflow: WorkflowConfig,
    /// Terminal chat configuration.
    pub chat: ChatConfig,
}

/// Which key-value backend holds the vehicle and user documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A single `SQLite` database file.
    #[default]
    Sqlite,
    /// Two pretty-printed JSON documents in a data directory.
    Json,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to use.
    pub backend: StorageBackend,
    /// Path to the database file (sqlite backend).
    /// Defaults to `~/.local/share/fuellog/fuellog.db`
    pub database_path: Option<PathBuf>,
    /// Directory holding `cars.json` and `users.json` (json backend).
    /// Defaults to `~/.local/share/fuellog`
    pub data_dir: Option<PathBuf>,
}

/// Trip workflow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Allowed difference between the declared trip distance and the sum of
    /// its city/highway/district parts, in km.
    pub distribution_tolerance: f64,
}

/// Terminal chat configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Account identifier that owns trips entered from the terminal.
    pub user_id: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            distribution_tolerance: 0.01,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let tolerance = self.workflow.distribution_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "distribution_tolerance must be a non-negative number, got {tolerance}"
                ),
            });
        }

        if self.chat.user_id.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "chat.user_id must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the JSON document directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.storage.database_path.is_none());
        assert!(config.storage.data_dir.is_none());
        assert!((config.workflow.distribution_tolerance - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.chat.user_id, "local");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_negative_tolerance() {
        let mut config = Config::default();
        config.workflow.distribution_tolerance = -0.5;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("distribution_tolerance"));
    }

    #[test]
    fn test_validate_nan_tolerance() {
        let mut config = Config::default();
        config.workflow.distribution_tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_blank_user_id() {
        let mut config = Config::default();
        config.chat.user_id = "   ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("user_id"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("fuellog.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_data_dir_default_and_custom() {
        let mut config = Config::default();
        assert!(config.data_dir().to_string_lossy().contains("fuellog"));

        config.storage.data_dir = Some(PathBuf::from("/srv/fuel"));
        assert_eq!(config.data_dir(), PathBuf::from("/srv/fuel"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("fuellog"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // A missing file falls back to defaults
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "fuellog_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[storage]\nbackend = \"json\"\ndata_dir = \"/tmp/fuel\"\n\n[workflow]\ndistribution_tolerance = 0.5\n\n[chat]\nuser_id = \"42\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/fuel"));
        assert_eq!(config.chat.user_id, "42");
        assert!((config.workflow.distribution_tolerance - 0.5).abs() < f64::EPSILON);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = std::env::temp_dir().join(format!(
            "fuellog_config_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[workflow]\ndistribution_tolerance = -1.0\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_storage_backend_display() {
        assert_eq!(StorageBackend::Sqlite.to_string(), "sqlite");
        assert_eq!(StorageBackend::Json.to_string(), "json");
    }

    #[test]
    fn test_storage_backend_deserialize() {
        let storage: StorageConfig = serde_json::from_str(r#"{"backend": "json"}"#).unwrap();
        assert_eq!(storage.backend, StorageBackend::Json);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("distribution_tolerance"));
        assert!(json.contains("\"backend\":\"sqlite\""));
    }
}
