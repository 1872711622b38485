//! Per-call context passed to a tool.

use tokio_util::sync::CancellationToken;

/// Context for one tool call: the originating call id and the run's cancellation token.
///
/// Tools that do long work should watch `cancellation` and stop early; the tool stage
/// also drops in-flight calls when the run is cancelled.
#[derive(Debug, Clone, Default)]
pub struct ToolCallContext {
    pub call_id: String,
    pub cancellation: CancellationToken,
}

impl ToolCallContext {
    pub fn new(call_id: impl Into<String>, cancellation: CancellationToken) -> Self {
        Self {
            call_id: call_id.into(),
            cancellation,
        }
    }
}
