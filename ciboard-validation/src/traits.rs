// Validation traits

use crate::ValidationErrors;
use serde_json::Value;

/// Checks a decoded payload before it is submitted anywhere.
pub trait Validator: Send + Sync {
    /// Validate the payload, reporting every failure found.
    fn validate(&self, payload: &Value) -> Result<(), ValidationErrors>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Result<(), ValidationErrors> + Send + Sync,
{
    fn validate(&self, payload: &Value) -> Result<(), ValidationErrors> {
        self(payload)
    }
}
