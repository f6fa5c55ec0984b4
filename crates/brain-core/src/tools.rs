//! Tool execution support for Brain implementations.
//!
//! A specialist is a model bound to a fixed toolset. The model asks for
//! tool calls by name with JSON arguments; a [`ToolExecutor`] runs them and
//! hands the output back to the model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The tool call ID this result corresponds to.
    pub tool_call_id: String,
    /// The result content (will be sent back to the model).
    pub content: String,
    /// Whether the tool execution succeeded.
    pub success: bool,
}

impl ToolResult {
    /// Create a successful tool result.
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed tool result.
    pub fn error(tool_call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: format!("Error: {}", error.into()),
            success: false,
        }
    }
}

/// A request to execute a tool.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// Unique ID for this tool call.
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: HashMap<String, Value>,
}

impl ToolRequest {
    /// Parse arguments from a JSON string.
    ///
    /// An empty argument string is treated as `{}`.
    pub fn from_call(
        id: String,
        name: String,
        arguments_json: &str,
    ) -> Result<Self, serde_json::Error> {
        let arguments: HashMap<String, Value> = if arguments_json.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(arguments_json)?
        };
        Ok(Self {
            id,
            name,
            arguments,
        })
    }

    /// Get a string argument by name.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }

    /// Get a required string argument, or return an error message.
    pub fn require_string(&self, key: &str) -> Result<&str, String> {
        self.get_string(key)
            .ok_or_else(|| format!("Missing required argument: {}", key))
    }
}

/// Description of a tool advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// Trait for executing tools called by a Brain.
///
/// # Example
///
/// ```ignore
/// use brain_core::{ToolExecutor, ToolRequest, ToolResult, ToolSpec};
///
/// struct Doubler;
///
/// #[async_trait]
/// impl ToolExecutor for Doubler {
///     async fn execute(&self, request: ToolRequest) -> ToolResult {
///         match request.arguments.get("n").and_then(|v| v.as_f64()) {
///             Some(n) => ToolResult::success(&request.id, (n * 2.0).to_string()),
///             None => ToolResult::error(&request.id, "Missing required argument: n"),
///         }
///     }
///
///     fn tool_specs(&self) -> Vec<ToolSpec> {
///         vec![ToolSpec {
///             name: "double".into(),
///             description: "Double a number".into(),
///             parameters: serde_json::json!({"type": "object"}),
///         }]
///     }
/// }
/// ```
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool and return the result.
    async fn execute(&self, request: ToolRequest) -> ToolResult;

    /// Describe the tools this executor supports.
    fn tool_specs(&self) -> Vec<ToolSpec>;

    /// Names of the supported tools.
    fn supported_tools(&self) -> Vec<String> {
        self.tool_specs().into_iter().map(|spec| spec.name).collect()
    }
}
