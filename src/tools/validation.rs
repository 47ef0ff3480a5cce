//! Validate tool call arguments against JSON Schema before execution.

use regex::Regex;
use serde_json::Value;

/// Validate tool arguments against a JSON Schema.
///
/// Recurses through `properties`, `items` and `anyOf`/`oneOf`, checking
/// `type` (single or list), `required`, `enum` and string `pattern`.
/// Returns `Err(message)` describing the first violation found.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), String> {
    validate_at(args, schema, "")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    let Some(schema_obj) = schema.as_object() else {
        return Ok(());
    };

    if let Some(branches) = schema_obj
        .get("anyOf")
        .or_else(|| schema_obj.get("oneOf"))
        .and_then(Value::as_array)
    {
        if !branches
            .iter()
            .any(|branch| validate_at(value, branch, path).is_ok())
        {
            return Err(format!("{} does not match any allowed schema", describe(path)));
        }
    }

    let types = declared_types(schema);
    if !types.is_empty() && !types.iter().any(|t| value_matches_type(value, t)) {
        return Err(if path.is_empty() {
            format!(
                "expected {} arguments, got {}",
                types.join(" or "),
                json_type_name(value)
            )
        } else {
            format!(
                "field '{}' expected type '{}', got {}",
                path,
                types.join("' or '"),
                json_type_name(value)
            )
        });
    }

    if let Some(allowed) = schema_obj.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(format!(
                "{} must be one of {}",
                describe(path),
                Value::Array(allowed.clone())
            ));
        }
    }

    if let (Some(pattern), Some(text)) = (
        schema_obj.get("pattern").and_then(Value::as_str),
        value.as_str(),
    ) {
        match Regex::new(pattern) {
            Ok(regex) if !regex.is_match(text) => {
                return Err(format!("{} does not match pattern '{pattern}'", describe(path)));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(pattern, error = %err, "skipping unparseable schema pattern");
            }
        }
    }

    if let Some(obj) = value.as_object() {
        if let Some(required) = schema_obj.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !obj.contains_key(name) {
                    return Err(format!("missing required field '{}'", join_path(path, name)));
                }
            }
        }
        if let Some(properties) = schema_obj.get("properties").and_then(Value::as_object) {
            for (key, field) in obj {
                if let Some(property_schema) = properties.get(key) {
                    validate_at(field, property_schema, &join_path(path, key))?;
                }
            }
        }
    }

    if let (Some(items), Some(elements)) = (schema_obj.get("items"), value.as_array()) {
        for (index, element) in elements.iter().enumerate() {
            validate_at(element, items, &format!("{path}[{index}]"))?;
        }
    }

    Ok(())
}

fn declared_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn describe(path: &str) -> String {
    if path.is_empty() {
        "arguments".to_string()
    } else {
        format!("field '{path}'")
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
