//! Run error types.
//!
//! Returned by graph nodes, routers, and the ReAct entry points (`generate`, `stream`,
//! `resume`). Construction-time problems use [`BuildError`](crate::agent::react::BuildError)
//! instead, so a caller can tell "the agent could not be built" from "this run failed".

use thiserror::Error;

use crate::tool_source::ToolSourceError;

/// Agent run error.
///
/// One variant per failure class a caller may want to branch on. `StepLimitExceeded`
/// is kept apart from `ExecutionFailed` so "the agent is looping" is distinguishable
/// from a capability failure.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, malformed stage input).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// A tool could not be found or failed while executing.
    #[error("tool error: {0}")]
    Tool(#[from] ToolSourceError),

    /// Reading an incremental model response failed.
    #[error("stream read failed: {0}")]
    StreamRead(String),

    /// A direct-return tool call was recorded but no tool result carries its id.
    #[error("no matching value: no tool result for direct-return call {tool_call_id}")]
    NoMatchingValue { tool_call_id: String },

    /// The run exceeded its maximum number of node executions.
    #[error("exceeded max steps ({0})")]
    StepLimitExceeded(usize),

    /// The run was cancelled through its cancellation token.
    #[error("run cancelled")]
    Cancelled,
}
