// Configuration management for the ciboard dashboard client

pub mod dashboard;
pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use dashboard::{DashboardConfig, ENV_PREFIX};
pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Layered key/value store. Later loads override earlier ones, so callers
/// load defaults first, then files, then the environment.
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: None,
        }
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(HashMap::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load();

        let mut config = self.config.write();
        for (key, value) in env_vars {
            config.insert(key, loader::scalar(&value));
        }
    }

    /// Load `.env` into the process environment, then load the environment.
    /// A missing default `.env` is not an error; a missing explicit path is.
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok();
        }
        self.load_env();
        Ok(())
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).load_file(path)?;
        self.merge_value(data);
        Ok(())
    }

    /// Merge the top-level keys of a JSON object.
    pub fn merge_value(&self, data: serde_json::Value) {
        if let serde_json::Value::Object(map) = data {
            let mut config = self.config.write();
            for (key, value) in map {
                config.insert(key, value);
            }
        }
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.config.write().insert(key.to_string(), json_value);

        Ok(())
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.config.read();

        let value = config
            .get(key)
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.config.read().contains_key(key)
    }

    /// Get all configuration keys
    pub fn keys(&self) -> Vec<String> {
        self.config.read().keys().cloned().collect()
    }

    /// Deserialize the whole store into `T` and run its validation.
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let json_value = {
            let config = self.config.read();
            serde_json::Value::Object(
                config.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )
        };

        let validated: T = serde_json::from_value(json_value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        validated.validate()?;

        Ok(validated)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
