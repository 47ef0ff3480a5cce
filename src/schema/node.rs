//! Parsed view of a JSON Schema, reduced to what reconciliation needs.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

/// A schema tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: SchemaKind,
    /// `type: "null"`, a type list containing `"null"`, or `nullable: true`.
    pub nullable: bool,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Object schema with declared `properties`.
    Object(ObjectSchema),
    /// Array schema, with its item schema when declared.
    Array(Option<Box<SchemaNode>>),
    /// `anyOf` / `oneOf` branches.
    Union(Vec<SchemaNode>),
    /// Anything else: scalar types, `null`, open objects, untyped schemas.
    Primitive(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: BTreeMap<String, SchemaNode>,
    pub required: BTreeSet<String>,
}

impl ObjectSchema {
    pub fn is_required(&self, key: &str) -> bool {
        self.required.contains(key)
    }
}

impl SchemaNode {
    /// Build a node from raw JSON Schema. Unrecognized shapes become
    /// [`SchemaKind::Primitive`] and are passed through untouched.
    pub fn from_json(schema: &Value) -> Self {
        let Some(obj) = schema.as_object() else {
            return Self::primitive(Vec::new());
        };

        let types = declared_types(schema);
        let nullable = types.iter().any(|t| t == "null")
            || obj.get("nullable").and_then(Value::as_bool).unwrap_or(false);
        let default = obj.get("default").cloned();

        let union = obj
            .get("anyOf")
            .or_else(|| obj.get("oneOf"))
            .and_then(Value::as_array);

        let kind = if let Some(branches) = union {
            SchemaKind::Union(branches.iter().map(Self::from_json).collect())
        } else if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
            SchemaKind::Object(ObjectSchema {
                properties: properties
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
                required: obj
                    .get("required")
                    .and_then(Value::as_array)
                    .map(|names| {
                        names
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
        } else if types.iter().any(|t| t == "array") || obj.contains_key("items") {
            SchemaKind::Array(
                obj.get("items")
                    .filter(|items| items.is_object())
                    .map(|items| Box::new(Self::from_json(items))),
            )
        } else {
            SchemaKind::Primitive(types)
        };

        Self {
            kind,
            nullable,
            default,
        }
    }

    fn primitive(types: Vec<String>) -> Self {
        Self {
            kind: SchemaKind::Primitive(types),
            nullable: false,
            default: None,
        }
    }

    /// Whether `null` is a legal value for this schema.
    pub fn can_be_null(&self) -> bool {
        if self.nullable {
            return true;
        }
        match &self.kind {
            SchemaKind::Union(branches) => branches.iter().any(SchemaNode::can_be_null),
            _ => false,
        }
    }

    /// Object schema with declared properties, if this is one.
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// `type` as a list: `"string"` → `["string"]`, `["string","null"]` as is.
fn declared_types(schema: &Value) -> Vec<String> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
