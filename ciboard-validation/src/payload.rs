//! Textual payload handling. Payloads are edited as YAML, which also accepts
//! plain JSON.

use crate::PayloadError;
use serde_json::Value;

/// Parse user-edited payload text. Blank text parses to `null`.
pub fn parse_payload(text: &str) -> Result<Value, PayloadError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text).map_err(|e| PayloadError::Parse(e.to_string()))
}

/// Render a value as YAML for display and editing.
pub fn to_yaml(value: &Value) -> Result<String, PayloadError> {
    serde_yaml::to_string(value).map_err(|e| PayloadError::Render(e.to_string()))
}
