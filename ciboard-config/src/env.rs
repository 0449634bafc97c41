// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Reads environment variables, optionally restricted to a prefix which is
/// stripped from the returned keys (`CIBOARD_REPO` -> `repo`).
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching environment variables with lowercased keys.
    pub fn load(&self) -> HashMap<String, String> {
        env::vars()
            .filter_map(|(key, value)| match &self.prefix {
                Some(prefix) => key
                    .strip_prefix(prefix.as_str())
                    .map(|rest| (rest.trim_start_matches('_').to_lowercase(), value)),
                None => Some((key.to_lowercase(), value)),
            })
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }

    /// Load a single variable, applying the prefix.
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
