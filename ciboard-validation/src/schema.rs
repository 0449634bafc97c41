//! JSON-Schema backed [`Validator`].

use crate::{PayloadError, ValidationError, ValidationErrors, Validator};
use serde_json::Value;
use std::fmt;

/// Validator compiled from an action's input schema.
pub struct SchemaValidator {
    compiled: jsonschema::Validator,
    schema: Value,
}

impl SchemaValidator {
    /// Compile `schema`; the draft is picked from its `$schema` keyword.
    pub fn compile(schema: &Value) -> Result<Self, PayloadError> {
        let compiled =
            jsonschema::validator_for(schema).map_err(|e| PayloadError::Schema(e.to_string()))?;
        Ok(Self {
            compiled,
            schema: schema.clone(),
        })
    }

    /// The schema this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Cheap yes/no check.
    pub fn is_valid(&self, payload: &Value) -> bool {
        self.compiled.is_valid(payload)
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, payload: &Value) -> Result<(), ValidationErrors> {
        let errors: Vec<ValidationError> = self
            .compiled
            .iter_errors(payload)
            .map(|e| {
                ValidationError::new(data_path(&e.instance_path.to_string()), e.to_string())
                    .with_constraint("schema")
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Render a JSON pointer as `data.key[0].other`.
pub fn data_path(pointer: &str) -> String {
    let mut out = String::from("data");
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(&segment);
            out.push(']');
        } else {
            out.push('.');
            out.push_str(&segment);
        }
    }
    out
}
