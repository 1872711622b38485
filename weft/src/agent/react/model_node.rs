//! Chat stage: record pending input, build the model input, call the model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::llm::LlmClient;
use crate::state::{ModelOutput, ReActState};
use crate::tool_source::ToolSpec;

use super::config::MessageModifier;
use super::NODE_CHAT;

/// Chat model node.
///
/// Appends the caller's input (first turn) or the previous tool results (later
/// turns) to history, then calls the model with history and the tool catalog. When a
/// message modifier is set, the model sees the modifier's output on a copy of
/// history; history itself is never rewritten. Blocking runs store a whole message
/// in `model_output`, streaming runs store the fragment reader.
pub struct ChatModelNode {
    llm: Arc<dyn LlmClient>,
    tools: Vec<ToolSpec>,
    modifier: Option<MessageModifier>,
}

impl ChatModelNode {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Vec<ToolSpec>,
        modifier: Option<MessageModifier>,
    ) -> Self {
        Self {
            llm,
            tools,
            modifier,
        }
    }
}

#[async_trait]
impl Node<ReActState> for ChatModelNode {
    fn id(&self) -> &str {
        NODE_CHAT
    }

    fn name(&self) -> &str {
        "ChatModel"
    }

    async fn run(&self, state: ReActState) -> Result<(ReActState, Next), AgentError> {
        self.run_with_context(state, &RunContext::default()).await
    }

    async fn run_with_context(
        &self,
        mut state: ReActState,
        ctx: &RunContext,
    ) -> Result<(ReActState, Next), AgentError> {
        let history = &mut state.conversation.history;
        history.append(&mut state.pending_input);
        history.append(&mut state.tool_results);

        let modified = self.modifier.as_ref().map(|m| m(history.clone()));
        let messages = modified.as_deref().unwrap_or(history.as_slice());
        debug!(
            message_count = messages.len(),
            tool_count = self.tools.len(),
            streaming = ctx.is_streaming(),
            "model turn"
        );

        let output = if ctx.is_streaming() {
            ModelOutput::Stream(self.llm.stream(messages, &self.tools).await?)
        } else {
            ModelOutput::Message(self.llm.invoke(messages, &self.tools).await?)
        };
        state.model_output = Some(output);
        Ok((state, Next::Continue))
    }
}
