//! Service configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors. All are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration of the search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Root directory holding `<api_version>/**/*.graphqls`
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Schema version to load
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Page size when `first` is absent
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Hard maximum for `first`
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Engine-level settings for index creation bodies
    #[serde(default = "default_index_settings")]
    pub index_settings: Value,
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("./search")
}
fn default_api_version() -> String {
    "v1".to_string()
}
fn default_page_size() -> usize {
    20
}
fn default_max_page_size() -> usize {
    2000
}
fn default_index_settings() -> Value {
    Value::Object(Map::new())
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            api_version: default_api_version(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            index_settings: default_index_settings(),
        }
    }
}

impl SearchConfig {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: SearchConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be > 0".into()));
        }

        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }

        if !self.index_settings.is_object() {
            return Err(ConfigError::Invalid("index_settings must be an object".into()));
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Invalid("api_version must not be empty".into()));
        }

        Ok(())
    }

    /// Directory holding the schema sources of the configured version
    pub fn version_dir(&self) -> PathBuf {
        self.schema_dir.join(&self.api_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, config: Value) -> PathBuf {
        let path = dir.path().join("search.json");
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SearchConfig::load(&write_config(&dir, json!({}))).unwrap();

        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.schema_dir, PathBuf::from("./search"));
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 2000);
        assert_eq!(config.index_settings, json!({}));
        assert_eq!(config.version_dir(), PathBuf::from("./search/v1"));
    }

    #[test]
    fn test_overrides() {
        let dir = TempDir::new().unwrap();
        let config = SearchConfig::load(&write_config(
            &dir,
            json!({
                "schema_dir": "/etc/search",
                "api_version": "v2",
                "max_page_size": 50,
                "index_settings": {"number_of_shards": 1},
            }),
        ))
        .unwrap();

        assert_eq!(config.version_dir(), PathBuf::from("/etc/search/v2"));
        assert_eq!(config.max_page_size, 50);
        assert_eq!(config.index_settings["number_of_shards"], json!(1));
    }

    #[test]
    fn test_validation() {
        let dir = TempDir::new().unwrap();
        for invalid in [
            json!({"max_page_size": 0}),
            json!({"default_page_size": 30, "max_page_size": 10}),
            json!({"index_settings": [1]}),
            json!({"api_version": " "}),
        ] {
            let result = SearchConfig::load(&write_config(&dir, invalid.clone()));
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{}", invalid);
        }
    }

    #[test]
    fn test_unreadable_or_malformed() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            SearchConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(SearchConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
