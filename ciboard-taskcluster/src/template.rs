//! Rendering of action templates.
//!
//! Action `task` and `hookPayload` templates are JSON-e documents, rendered
//! with the reference `json-e` implementation against the submission context.

use crate::{Result, TaskclusterError};
use serde_json::{Map, Value};

/// Render `template` against `context`.
pub fn render(template: &Value, context: &Map<String, Value>) -> Result<Value> {
    json_e::render(template, &Value::Object(context.clone()))
        .map_err(|e| TaskclusterError::Template(e.to_string()))
}
