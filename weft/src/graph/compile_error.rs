//! Graph compilation error.

use thiserror::Error;

/// Error when compiling a state graph (unknown node, bad wiring, bad step bound).
///
/// Returned by `StateGraph::compile()`.
#[derive(Debug, Clone, Error)]
pub enum CompilationError {
    /// A node id in an edge was not registered via `add_node` (and is not START/END).
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge has from_id == START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// Nothing ever routes to END.
    #[error("graph must have an edge to END")]
    MissingEnd,

    /// Unconditional edges branch or cycle where a single chain is required.
    #[error("invalid edge chain: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges; it must have exactly one.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A value in a conditional path_map is not a valid node id or END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),

    /// `with_max_steps(0)`: no run could ever execute a node.
    #[error("max steps must be at least 1")]
    ZeroMaxSteps,
}
