//! Strict-mode schema transform for model APIs that reject optional fields.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::node::SchemaNode;

/// Make every object property required, turning originally-optional
/// properties into `anyOf: [<original>, {"type": "null"}]`.
///
/// Object schemas get `additionalProperties: false` and lose `default`
/// (strict mode rejects it). The input is not modified.
pub fn strictify(schema: &Value) -> Value {
    let Value::Object(obj) = schema else {
        return schema.clone();
    };

    let mut strict = Map::new();
    for (key, value) in obj {
        match key.as_str() {
            "properties" | "required" | "default" => {}
            "items" => {
                strict.insert(key.clone(), strictify(value));
            }
            "anyOf" | "oneOf" => {
                let branches = match value {
                    Value::Array(items) => Value::Array(items.iter().map(strictify).collect()),
                    other => other.clone(),
                };
                strict.insert(key.clone(), branches);
            }
            _ => {
                strict.insert(key.clone(), value.clone());
            }
        }
    }

    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        let required: BTreeSet<&str> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut strict_properties = Map::new();
        for (name, property) in properties {
            let mut next = strictify(property);
            if !required.contains(name.as_str()) && !SchemaNode::from_json(property).can_be_null() {
                next = serde_json::json!({ "anyOf": [next, { "type": "null" }] });
            }
            strict_properties.insert(name.clone(), next);
        }

        let all_required: Vec<Value> = properties
            .keys()
            .map(|name| Value::String(name.clone()))
            .collect();
        strict.insert("properties".to_string(), Value::Object(strict_properties));
        strict.insert("required".to_string(), Value::Array(all_required));
        strict
            .entry("additionalProperties")
            .or_insert(Value::Bool(false));
    }

    Value::Object(strict)
}
