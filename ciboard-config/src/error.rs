//! Configuration errors.

use thiserror::Error;

/// Failure while loading, merging or reading dashboard settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No layer defines the key.
    #[error("Configuration key not found: {0}")]
    KeyNotFound(String),

    /// A settings file or `.env` file could not be read.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// A settings file was read but is not valid TOML or JSON.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Settings parsed but failed a check, such as a URL without a scheme.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A value exists but has the wrong shape for the requested type.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
