//! Helpers to build JSON schemas for tool and agent contracts

use serde_json::{Value, json};

/// Create a JSON schema for an object with properties
pub fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Create a string property
pub fn string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

/// Create a string property restricted to a set of values
pub fn string_enum(description: &str, values: &[&str]) -> Value {
    json!({
        "type": "string",
        "description": description,
        "enum": values,
    })
}

/// Create a number property
pub fn number(description: &str) -> Value {
    json!({
        "type": "number",
        "description": description,
    })
}

/// Create a boolean property
pub fn boolean(description: &str) -> Value {
    json!({
        "type": "boolean",
        "description": description,
    })
}

/// Create an array property
pub fn array(description: &str, items: Value) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": items,
    })
}

/// Allow `null` in addition to the given schema
pub fn nullable(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("nullable".to_string(), Value::Bool(true));
    }
    schema
}
