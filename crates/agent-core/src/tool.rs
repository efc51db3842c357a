//! Tool System
//!
//! Extensible tool framework for agent capabilities. Tools declare a
//! parameter schema at registration time and are invoked by the
//! orchestration loop when the model requests them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool-call request from the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlates this request to its result within one model turn
    pub call_id: String,

    /// Tool identifier
    pub tool_name: String,

    /// Arguments as name-value pairs
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// Classification of a tool-call fault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFaultKind {
    /// Requested tool is not in the registry
    UnknownTool,

    /// Arguments violate the declared parameter schema
    InvalidArguments,

    /// The handler itself failed
    ExecutionFailed,
}

/// Tagged outcome of a tool invocation
///
/// Faults are data, not propagating failures: the orchestrator inspects the
/// tag and the model sees the error on the next invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ToolOutcome {
    /// Serializable success value returned by the handler
    Ok { value: serde_json::Value },

    /// Structured error carried back to the model
    Err { kind: ToolFaultKind, message: String },
}

/// Result from tool execution, matched to its request by call id
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Call ID from the originating request
    pub call_id: String,

    /// Tool that was called
    pub tool_name: String,

    /// Success value or structured error
    pub outcome: ToolOutcome,
}

impl ToolCallResult {
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            outcome: ToolOutcome::Ok { value },
        }
    }

    pub fn failure(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        kind: ToolFaultKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            outcome: ToolOutcome::Err {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Ok { .. })
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn new(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required,
        }
    }
}

/// Tool definition advertised to the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

/// Check a supplied value against a declared JSON Schema type name.
fn value_matches_type(value: &serde_json::Value, param_type: &str) -> bool {
    match param_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // Unrecognized declared types are not enforced
        _ => true,
    }
}

/// Tool trait - implement to add new capabilities
///
/// Handlers must not assume anything about concurrent invocation safety
/// beyond what they document.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's declaration, advertised to the model
    fn declaration(&self) -> ToolDeclaration;

    /// Execute the tool with the given arguments
    async fn invoke(
        &self,
        arguments: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Value>;

    /// Validate arguments against the declared schema before execution
    fn validate(&self, arguments: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
        let declaration = self.declaration();

        for param in &declaration.parameters {
            match arguments.get(&param.name) {
                None if param.required => {
                    return Err(AgentError::SchemaValidation(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                Some(value) if !value_matches_type(value, &param.param_type) => {
                    return Err(AgentError::SchemaValidation(format!(
                        "Parameter '{}' expects type {}",
                        param.name, param.param_type
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Registry for available tools
///
/// Registration order is preserved so the declaration list sent to the model
/// is deterministic. Duplicate names fail at registration time, not at call
/// time.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool handle
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.declaration().name;
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    /// All registered declarations, in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.declaration())
            .collect()
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
