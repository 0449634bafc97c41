//! Payload validation for remote actions.
//!
//! Actions may publish a JSON Schema for their input. Before anything is
//! submitted, the user's payload text is parsed ([`parse_payload`]) and run
//! through a [`Validator`]; the schema-backed implementation is
//! [`SchemaValidator`]. [`schema_defaults`] produces the initial payload shown
//! for editing.
//!
//! ```
//! use ciboard_validation::{parse_payload, schema_defaults, SchemaValidator, Validator};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"times": {"type": "integer", "maximum": 100, "default": 1}},
//!     "required": ["times"]
//! });
//!
//! assert_eq!(schema_defaults(&schema), Some(json!({"times": 1})));
//!
//! let validator = SchemaValidator::compile(&schema).unwrap();
//! let payload = parse_payload("times: 500").unwrap();
//! let errors = validator.validate(&payload).unwrap_err();
//! assert!(errors.text().starts_with("data.times"));
//! ```

mod defaults;
mod errors;
mod payload;
mod schema;
mod traits;

pub use defaults::{MAX_DEFAULT_ITEMS, schema_defaults};
pub use errors::*;
pub use payload::{parse_payload, to_yaml};
pub use schema::{SchemaValidator, data_path};
pub use traits::*;
