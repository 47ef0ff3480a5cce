//! Typed access to tool call arguments.

use serde_json::{Map, Value};

use crate::error::OrbitError;

/// Wrapper around validated tool call arguments.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Parse raw streamed argument text. Blank text means "no arguments".
    pub fn parse(raw: &str) -> Result<Self, OrbitError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(Value::Object(Map::new())));
        }
        serde_json::from_str::<Value>(trimmed)
            .map(Self::new)
            .map_err(|e| OrbitError::InvalidArgument(format!("arguments are not valid JSON: {e}")))
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, OrbitError> {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| OrbitError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(Value::as_str)
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, OrbitError> {
        self.value
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| OrbitError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, OrbitError> {
        self.value
            .get(key)
            .and_then(Value::as_bool)
            .ok_or_else(|| OrbitError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Caller-injected keys carrying `prefix`, with the prefix stripped.
    pub fn pass_through(&self, prefix: &str) -> Map<String, Value> {
        self.value
            .as_object()
            .map(|object| {
                object
                    .iter()
                    .filter_map(|(key, value)| {
                        key.strip_prefix(prefix)
                            .map(|stripped| (stripped.to_string(), value.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, OrbitError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            OrbitError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_text_parses_as_empty_object() {
        let args = ToolArguments::parse("   ").expect("blank is fine");
        assert_eq!(args.raw(), &json!({}));
    }

    #[test]
    fn malformed_text_is_invalid_argument() {
        let err = ToolArguments::parse("{\"a\":").expect_err("truncated json");
        assert!(matches!(err, OrbitError::InvalidArgument(_)));
    }

    #[test]
    fn pass_through_strips_prefix() {
        let args = ToolArguments::new(json!({ "q": "x", "_orbit_user": "u1" }));
        let extra = args.pass_through("_orbit_");
        assert_eq!(extra.get("user"), Some(&json!("u1")));
        assert_eq!(extra.len(), 1);
    }

    #[test]
    fn typed_getters() {
        let args = ToolArguments::new(json!({ "name": "Alice", "age": 30, "admin": false }));
        assert_eq!(args.get_str("name").expect("name"), "Alice");
        assert_eq!(args.get_i64("age").expect("age"), 30);
        assert!(!args.get_bool("admin").expect("admin"));
        assert!(args.get_str("missing").is_err());
        assert_eq!(args.get_str_opt("missing"), None);
    }
}
