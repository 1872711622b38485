//! Tool capability and tool execution.
//!
//! - [`Tool`]: one callable tool (descriptor via `info`, execution via `call`).
//! - [`ToolExecutor`]: runs all tool calls of one assistant turn and returns one tool
//!   message per call, tagged with the call id.
//! - [`ToolRegistry`]: the default executor; resolves a tool catalog once and
//!   dispatches calls by name.
//! - [`MockTool`]: fixed-result tool for tests and examples.

mod mock;
mod registry;

pub use mock::MockTool;
pub use registry::{parse_tool_arguments, ToolRegistry};

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};

/// A single tool that can be called by the model.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use weft::tools::Tool;
/// use weft::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
///
/// struct Clock;
///
/// #[async_trait]
/// impl Tool for Clock {
///     async fn info(&self) -> Result<ToolSpec, ToolSourceError> {
///         Ok(ToolSpec {
///             name: "get_time".to_string(),
///             description: Some("Current time".to_string()),
///             input_schema: serde_json::json!({}),
///         })
///     }
///
///     async fn call(
///         &self,
///         _args: Value,
///         _ctx: &ToolCallContext,
///     ) -> Result<ToolCallContent, ToolSourceError> {
///         Ok(ToolCallContent { text: "12:00".to_string() })
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor for the catalog. Called once when the agent is built.
    async fn info(&self) -> Result<ToolSpec, ToolSourceError>;

    /// Executes the tool with parsed JSON arguments.
    async fn call(
        &self,
        args: Value,
        ctx: &ToolCallContext,
    ) -> Result<ToolCallContent, ToolSourceError>;
}

/// Executes the tool calls of one assistant turn.
///
/// Must return one tool message per call, each with `tool_call_id` equal to the
/// call's id, and must not return before every call has finished.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(
        &self,
        tool_calls: &[ToolCall],
        cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, AgentError>;
}
