//! Direct-return stage: end the run with the marked tool result.

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::state::{ModelOutput, ReActState};

use super::NODE_DIRECT_RETURN;

/// Picks the tool result whose `tool_call_id` equals `pending_direct_return_id` and
/// makes it the run's output.
///
/// All results of the turn are recorded in history and the marker is consumed. A
/// marker with no matching result fails with [`AgentError::NoMatchingValue`].
pub struct DirectReturnNode;

#[async_trait]
impl Node<ReActState> for DirectReturnNode {
    fn id(&self) -> &str {
        NODE_DIRECT_RETURN
    }

    fn name(&self) -> &str {
        "DirectReturn"
    }

    async fn run(&self, mut state: ReActState) -> Result<(ReActState, Next), AgentError> {
        let call_id = state
            .conversation
            .pending_direct_return_id
            .take()
            .ok_or_else(|| {
                AgentError::ExecutionFailed("direct return reached without a marked call".into())
            })?;
        let results = std::mem::take(&mut state.tool_results);
        let output = results
            .iter()
            .find(|m| m.tool_call_id() == Some(call_id.as_str()))
            .cloned()
            .ok_or_else(|| AgentError::NoMatchingValue {
                tool_call_id: call_id.clone(),
            })?;
        debug!(call_id = %call_id, "returning tool result directly");
        state.conversation.history.extend(results);
        state.final_output = Some(ModelOutput::Message(output));
        Ok((state, Next::End))
    }
}
