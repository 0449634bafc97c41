//! Derive an initial payload from a schema's `default` keywords.

use serde_json::{Map, Value};

/// Build the default payload described by `schema`.
///
/// An explicit `default` wins. Objects collect the defaults of their
/// properties, skipping properties without one. Arrays yield `minItems`
/// copies of the item default, or an empty list when there is no item
/// default or `minItems` exceeds [`MAX_DEFAULT_ITEMS`]. `allOf` members are merged
/// and local `$ref`s into `#/definitions` or `#/$defs` are followed.
/// Returns `None` when nothing in the schema provides a value.
pub fn schema_defaults(schema: &Value) -> Option<Value> {
    defaults_with_root(schema, schema, 0)
}

const MAX_REF_DEPTH: usize = 32;

/// Largest `minItems` filled in with item defaults.
pub const MAX_DEFAULT_ITEMS: u64 = 100;

fn defaults_with_root(schema: &Value, root: &Value, depth: usize) -> Option<Value> {
    if depth > MAX_REF_DEPTH {
        return None;
    }

    let object = schema.as_object()?;

    if let Some(default) = object.get("default") {
        return Some(default.clone());
    }

    if let Some(Value::Array(parts)) = object.get("allOf") {
        let merged = merge_all_of(parts, root, depth);
        return defaults_with_root(&merged, root, depth + 1);
    }

    if let Some(Value::String(reference)) = object.get("$ref") {
        return resolve_ref(reference, root)
            .and_then(|target| defaults_with_root(target, root, depth + 1));
    }

    match object.get("type").and_then(Value::as_str) {
        Some("object") => {
            let mut defaults = Map::new();
            if let Some(Value::Object(properties)) = object.get("properties") {
                for (key, property) in properties {
                    if let Some(value) = defaults_with_root(property, root, depth + 1) {
                        defaults.insert(key.clone(), value);
                    }
                }
            }
            Some(Value::Object(defaults))
        }
        Some("array") => {
            let count = object
                .get("minItems")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let item = object
                .get("items")
                .and_then(|items| defaults_with_root(items, root, depth + 1));
            match item {
                Some(item) if count > 0 && count <= MAX_DEFAULT_ITEMS => {
                    Some(Value::Array(vec![item; count as usize]))
                }
                _ => Some(Value::Array(Vec::new())),
            }
        }
        _ => None,
    }
}

fn resolve_ref<'a>(reference: &str, root: &'a Value) -> Option<&'a Value> {
    let pointer = reference.strip_prefix('#')?;
    root.pointer(pointer)
}

/// Shallow merge of `allOf` members: `properties` are unioned, other
/// keywords from later members win.
fn merge_all_of(parts: &[Value], root: &Value, depth: usize) -> Value {
    let mut merged = Map::new();
    let mut properties = Map::new();

    for part in parts {
        let part = match part.get("$ref").and_then(Value::as_str) {
            Some(reference) if depth < MAX_REF_DEPTH => resolve_ref(reference, root).unwrap_or(part),
            _ => part,
        };
        let Some(object) = part.as_object() else {
            continue;
        };
        for (key, value) in object {
            match (key.as_str(), value) {
                ("properties", Value::Object(props)) => {
                    for (name, schema) in props {
                        properties.insert(name.clone(), schema.clone());
                    }
                }
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
    }

    if !properties.is_empty() {
        merged.insert("properties".to_string(), Value::Object(properties));
        merged
            .entry("type".to_string())
            .or_insert_with(|| Value::String("object".to_string()));
    }

    Value::Object(merged)
}
