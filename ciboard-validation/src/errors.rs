// Validation errors

use std::fmt;
use thiserror::Error;

/// One failed check against a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Location in the payload, rendered `data.requests[0].times`.
    pub field: String,

    /// Error message
    pub message: String,

    /// Rule that failed (`schema`, `required`, ...)
    pub constraint: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
        }
    }

    /// Set the constraint name
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Every failure found in one validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add an error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Single-line summary shown to the user: each error, joined by `, `.
    pub fn text(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "errors": self.errors.iter().map(|e| {
                serde_json::json!({
                    "field": e.field,
                    "message": e.message,
                    "constraint": e.constraint,
                })
            }).collect::<Vec<_>>()
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

/// Failures of the payload gate in front of an action submission.
#[derive(Debug, Clone, Error)]
pub enum PayloadError {
    /// The textual payload is not valid YAML/JSON.
    #[error("YAML Error: {0}")]
    Parse(String),

    /// The payload parsed but does not satisfy the schema.
    #[error("{0}")]
    Invalid(ValidationErrors),

    /// The schema itself could not be compiled.
    #[error("Invalid schema: {0}")]
    Schema(String),

    /// A value could not be rendered as YAML.
    #[error("Could not render YAML: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_text_joins_with_comma() {
        let errors = ValidationErrors::new(vec![
            ValidationError::new("data.times", "must be <= 100"),
            ValidationError::new("data", "must have required property 'tasks'"),
        ]);
        assert_eq!(
            errors.text(),
            "data.times must be <= 100, data must have required property 'tasks'"
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_payload_error_display() {
        assert_eq!(
            PayloadError::Parse("bad indentation".into()).to_string(),
            "YAML Error: bad indentation"
        );
        let invalid = PayloadError::Invalid(vec![ValidationError::new("data", "oops")].into());
        assert_eq!(invalid.to_string(), "data oops");
    }
}
