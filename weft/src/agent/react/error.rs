//! Error type for building a ReAct agent.

use crate::graph::CompilationError;
use crate::state::StateTypeError;
use crate::tool_source::ToolSourceError;

/// Configuration error: the agent could not be built and no run was started.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("model is required")]
    MissingModel,
    /// A tool's `info()` failed, or the catalog has an empty or duplicate name.
    #[error("tool catalog: {0}")]
    ToolCatalog(#[from] ToolSourceError),
    #[error("return-directly tool not in catalog: {0}")]
    UnknownReturnDirectlyTool(String),
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("state type registration: {0}")]
    StateType(#[from] StateTypeError),
}
