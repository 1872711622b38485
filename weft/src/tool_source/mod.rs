//! Tool descriptors, call results, per-call context, and tool errors.
//!
//! These are the shapes exchanged with tool capabilities: [`Tool::info`](crate::tools::Tool::info)
//! returns a [`ToolSpec`], [`Tool::call`](crate::tools::Tool::call) receives a
//! [`ToolCallContext`] and returns [`ToolCallContent`] or a [`ToolSourceError`].

mod context;

pub use context::ToolCallContext;

use serde_json::Value;
use thiserror::Error;

/// Tool specification handed to the model as part of the tool catalog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    /// Tool name; the model refers to the tool by this name in tool calls.
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Result of a single tool call.
///
/// **Interaction**: returned by `Tool::call`; the tool stage wraps `text` in a tool
/// message tagged with the originating call id.
#[derive(Debug, Clone)]
pub struct ToolCallContent {
    pub text: String,
}

/// Errors from resolving or calling tools.
#[derive(Debug, Clone, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),
}
