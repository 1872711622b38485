//! Per-run options for `generate`, `stream` and `resume`.

use tokio_util::sync::CancellationToken;

use crate::graph::{RunContext, RunMode};

/// Options for one run.
///
/// `cancellation` is handed to the model and tool stages; cancelling it fails the
/// run with [`AgentError::Cancelled`](crate::error::AgentError::Cancelled) and
/// releases any stream being read. `run_id` is recorded on the run's tracing span.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cancellation: CancellationToken,
    pub run_id: Option<String>,
}

impl RunOptions {
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub(super) fn run_context(&self, mode: RunMode) -> RunContext {
        RunContext {
            mode,
            cancellation: self.cancellation.clone(),
            run_id: self.run_id.clone(),
            resume_from_node_id: None,
        }
    }
}
