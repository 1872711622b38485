//! Run context passed into nodes and routers.
//!
//! Holds the run mode (blocking or streaming), the run's cancellation token, an
//! optional run id for logs, and an optional node to start from instead of the
//! graph's entry node.

use tokio_util::sync::CancellationToken;

/// Which entry point started the run.
///
/// Nodes that talk to the model use it to choose `invoke` or `stream`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Invoke,
    Stream,
}

/// Run context passed into nodes for mode- and cancellation-aware execution.
///
/// # Example
///
/// ```rust
/// use weft::graph::{RunContext, RunMode};
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = RunContext::new(RunMode::Stream)
///     .with_cancellation(token.clone())
///     .with_run_id("run-1");
/// assert_eq!(ctx.mode, RunMode::Stream);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub mode: RunMode,
    /// Cancelling it aborts the node or router currently awaiting and fails the run.
    pub cancellation: CancellationToken,
    pub run_id: Option<String>,
    /// When set and the id names a node, the run starts there instead of at the entry node.
    pub resume_from_node_id: Option<String>,
}

impl RunContext {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_resume_from(mut self, node_id: impl Into<String>) -> Self {
        self.resume_from_node_id = Some(node_id.into());
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.mode == RunMode::Stream
    }
}
