//! Name-indexed tool store with schema-checked, failure-proof execution.

use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::ToolDescriptor;
use super::validation::validate_arguments;
use crate::error::{OrbitError, Result};
use crate::schema::strictify;
use crate::types::ToolResult;

/// Registered tools, keyed by name.
///
/// Registration is expected to finish before any run starts; afterwards the
/// registry is shared read-only (`Arc<ToolRegistry>`) across runs.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A second tool with the same name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(OrbitError::DuplicateTool(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Original input schemas by tool name, for argument reconciliation.
    pub fn input_schemas(&self) -> HashMap<String, Value> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.parameters().schema.clone()))
            .collect()
    }

    /// Descriptors for the outgoing run request.
    pub fn to_protocol_format(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.parameters().schema.clone(),
                output_schema: tool.output_schema().cloned(),
            })
            .collect()
    }

    /// Descriptors whose input schemas are rewritten for strict-mode models.
    pub fn to_strict_protocol_format(&self) -> Vec<ToolDescriptor> {
        self.to_protocol_format()
            .into_iter()
            .map(|mut descriptor| {
                descriptor.input_schema = strictify(&descriptor.input_schema);
                descriptor
            })
            .collect()
    }

    /// Resolve one call. Every failure becomes an error [`ToolResult`];
    /// nothing is returned as `Err` and tool panics do not escape.
    pub async fn execute(&self, name: &str, call_id: &str, raw_arguments: &str) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!(tool = name, call_id, "model called an unknown tool");
            return ToolResult::error(call_id, format!("Unknown tool: {name}"));
        };

        let args = match ToolArguments::parse(raw_arguments) {
            Ok(args) => args,
            Err(err) => {
                return ToolResult::error(
                    call_id,
                    format!("Invalid arguments for tool '{name}': {err}"),
                );
            }
        };

        if let Err(message) = validate_arguments(args.raw(), &tool.parameters().schema) {
            return ToolResult::error(
                call_id,
                format!("Argument validation failed for tool '{name}': {message}"),
            );
        }

        let ctx = ToolExecutionContext {
            call_id: call_id.to_string(),
            tool_name: name.to_string(),
            metadata: Value::Null,
        };
        match AssertUnwindSafe(tool.execute(&args, &ctx)).catch_unwind().await {
            Ok(Ok(output)) => ToolResult::success(call_id, render_output(output)),
            Ok(Err(err)) => {
                tracing::debug!(tool = name, call_id, error = %err, "tool returned an error");
                ToolResult::error(call_id, err.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(tool = name, call_id, message = %message, "tool panicked");
                ToolResult::error(call_id, format!("Tool '{name}' panicked: {message}"))
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn render_output(output: Value) -> String {
    match output {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}
