// Configuration validation

use crate::{ConfigError, Result};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Field-level checks shared by configuration structs.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a number is within an inclusive range
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate an absolute http(s) URL without a trailing slash, since
    /// endpoint paths are appended to it.
    pub fn is_base_url(value: &str, field: &str) -> Result<()> {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "{} must be an http(s) URL",
                field
            )));
        }
        if value.ends_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "{} must not end with '/'",
                field
            )));
        }
        Ok(())
    }

    /// Validate email format (basic)
    pub fn is_email(value: &str, field: &str) -> Result<()> {
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{} must be a valid email",
                field
            ))),
        }
    }
}
