//! Routers after the chat stage and after the tool stage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Router, RunContext, END};
use crate::state::{ModelOutput, ReActState};
use crate::stream::MessageStream;

use super::detector::StreamToolCallDetector;
use super::{NODE_CHAT, NODE_DIRECT_RETURN, NODE_TOOLS};

/// Post-model decision: tool stage if the turn asks for tools, else END.
///
/// A streamed turn is split in two: the detector reads one copy and the other is
/// put back, complete, for the tool stage or the caller. On END the turn becomes
/// `final_output`; a whole message is also recorded in history.
pub struct ModelBranch {
    detector: Arc<dyn StreamToolCallDetector>,
}

impl ModelBranch {
    pub fn new(detector: Arc<dyn StreamToolCallDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl Router<ReActState> for ModelBranch {
    async fn route(&self, state: &mut ReActState, _ctx: &RunContext) -> Result<String, AgentError> {
        let output = state
            .model_output
            .take()
            .ok_or_else(|| AgentError::ExecutionFailed("no model output to route".into()))?;
        let (has_tool_calls, output) = match output {
            ModelOutput::Message(message) => {
                let hit = self
                    .detector
                    .detect(MessageStream::from_message(&message))
                    .await?;
                (hit, ModelOutput::Message(message))
            }
            ModelOutput::Stream(stream) => {
                let (probe, kept) = stream.tee();
                let hit = self.detector.detect(probe).await?;
                (hit, ModelOutput::Stream(kept))
            }
        };
        debug!(has_tool_calls, "tool call detection");

        if has_tool_calls {
            state.model_output = Some(output);
            return Ok(NODE_TOOLS.to_string());
        }
        if let ModelOutput::Message(message) = &output {
            state.conversation.history.push(message.clone());
        }
        state.final_output = Some(output);
        Ok(END.to_string())
    }
}

/// Post-tool decision, used only when direct return is configured: direct-return
/// stage if a call was marked, else back to the chat stage.
pub struct ToolsBranch;

#[async_trait]
impl Router<ReActState> for ToolsBranch {
    async fn route(&self, state: &mut ReActState, _ctx: &RunContext) -> Result<String, AgentError> {
        Ok(if state.conversation.pending_direct_return_id.is_some() {
            NODE_DIRECT_RETURN.to_string()
        } else {
            NODE_CHAT.to_string()
        })
    }
}
