// Configuration file loaders

use crate::{ConfigError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// Configuration file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Pick the format from the file extension.
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!("No file extension on {}", path.display()))
            })?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    /// Load configuration from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse configuration from string
    pub fn parse(&self, content: &str) -> Result<Value> {
        match self.format {
            FileFormat::Json => parse_json(content),
            FileFormat::Toml => parse_toml(content),
            FileFormat::Env => Ok(parse_env(content)),
        }
    }
}

fn parse_json(content: &str) -> Result<Value> {
    serde_json::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
}

fn parse_toml(content: &str) -> Result<Value> {
    let toml_value: toml::Value = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

    serde_json::to_value(toml_value).map_err(|e| ConfigError::SerializationError(e.to_string()))
}

fn parse_env(content: &str) -> Value {
    let mut map = serde_json::Map::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_lowercase();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            map.insert(key, scalar(value));
        }
    }

    Value::Object(map)
}

/// Interpret a raw string from an env file or variable: numbers and booleans
/// keep their type so typed config structs deserialize, anything else stays a
/// string.
pub(crate) fn scalar(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let loader = ConfigLoader::new(FileFormat::Json);
        let result = loader.parse(r#"{"repo": "autoland", "timeout_secs": 30}"#).unwrap();
        assert_eq!(result["repo"], "autoland");
        assert_eq!(result["timeout_secs"], 30);
    }

    #[test]
    fn test_parse_toml() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        let toml = r#"
            repo = "autoland"
            timeout_secs = 45
        "#;

        let result = loader.parse(toml).unwrap();
        assert_eq!(result["repo"], "autoland");
        assert_eq!(result["timeout_secs"], 45);
    }

    #[test]
    fn test_parse_env() {
        let loader = ConfigLoader::new(FileFormat::Env);
        let env = r#"
            REPO=try
            TIMEOUT_SECS=12
            # Comment
            USER_EMAIL="dev@example.com"
        "#;

        let result = loader.parse(env).unwrap();
        assert_eq!(result["repo"], "try");
        assert_eq!(result["timeout_secs"], 12);
        assert_eq!(result["user_email"], "dev@example.com");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let loader = ConfigLoader::new(FileFormat::Toml);
        assert!(matches!(
            loader.parse("repo = "),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("yaml"), None);
        assert!(ConfigLoader::auto("ciboard").is_err());
    }
}
