//! Undo strict-schema artifacts in model-produced tool arguments.
//!
//! Some model APIs require every property to be required, so optional
//! properties are sent as required-but-nullable and the model answers with
//! explicit `null`s. Given the tool's *original* schema, these functions
//! restore the original optionality.

use serde_json::{Map, Value};

use super::node::{ObjectSchema, SchemaKind, SchemaNode};
use crate::error::{OrbitError, Result};

/// Reconcile raw tool arguments against the tool's original JSON Schema.
///
/// At every object level, keys starting with `pass_through_prefix` are kept
/// verbatim, keys the schema does not declare are dropped, and declared
/// keys go through [`unstrictify`].
pub fn reconcile_arguments(
    schema: &Value,
    arguments: &Value,
    pass_through_prefix: &str,
) -> Result<Value> {
    let node = SchemaNode::from_json(schema);
    reconcile_node(&node, arguments, pass_through_prefix)
}

/// Reconcile against an already-parsed schema tree.
pub fn reconcile_node(node: &SchemaNode, value: &Value, pass_through_prefix: &str) -> Result<Value> {
    let (Some(schema), Some(object)) = (node.as_object(), value.as_object()) else {
        return Ok(value.clone());
    };

    let mut known = Map::new();
    let mut pass_through = Map::new();
    for (key, field) in object {
        if key.starts_with(pass_through_prefix) {
            pass_through.insert(key.clone(), field.clone());
        } else if schema.properties.contains_key(key) {
            known.insert(key.clone(), field.clone());
        } else {
            tracing::debug!(key = %key, "dropping undeclared tool argument");
        }
    }

    let mut cleaned = unstrictify_object(schema, &known, pass_through_prefix)?;
    cleaned.extend(pass_through);
    Ok(Value::Object(cleaned))
}

/// Strict core: every key of `arguments` must be declared by `schema`.
///
/// Callers are expected to have filtered undeclared and pass-through keys
/// first; an unknown key is an error here. Non-object schemas or values are
/// returned unchanged.
pub fn unstrictify(schema: &SchemaNode, arguments: &Value, pass_through_prefix: &str) -> Result<Value> {
    match (schema.as_object(), arguments.as_object()) {
        (Some(schema), Some(object)) => {
            unstrictify_object(schema, object, pass_through_prefix).map(Value::Object)
        }
        _ => Ok(arguments.clone()),
    }
}

fn unstrictify_object(
    schema: &ObjectSchema,
    object: &Map<String, Value>,
    pass_through_prefix: &str,
) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for (key, value) in object {
        let property = schema
            .properties
            .get(key)
            .ok_or_else(|| OrbitError::Schema(format!("unknown parameter `{key}`")))?;

        if value.is_null() {
            if schema.is_required(key) || property.can_be_null() {
                out.insert(key.clone(), Value::Null);
            } else if let Some(default) = &property.default {
                out.insert(key.clone(), default.clone());
            }
            continue;
        }

        let cleaned = match &property.kind {
            SchemaKind::Array(Some(items)) if items.as_object().is_some() => match value {
                Value::Array(elements) => Value::Array(
                    elements
                        .iter()
                        .map(|element| reconcile_node(items, element, pass_through_prefix))
                        .collect::<Result<Vec<_>>>()?,
                ),
                other => other.clone(),
            },
            SchemaKind::Object(_) => match value {
                Value::Object(_) => reconcile_node(property, value, pass_through_prefix)?,
                // Permissive caller schemas sometimes make the model send the
                // nested object as a JSON string.
                Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                    Ok(parsed @ Value::Object(_)) => {
                        reconcile_node(property, &parsed, pass_through_prefix)?
                    }
                    _ => value.clone(),
                },
                other => other.clone(),
            },
            _ => value.clone(),
        };
        out.insert(key.clone(), cleaned);
    }
    Ok(out)
}
