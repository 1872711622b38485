//! Tool stage: record the assistant turn, mark a direct-return call, execute tools.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::message::Message;
use crate::state::ReActState;
use crate::tools::ToolExecutor;

use super::NODE_TOOLS;

/// Tools node.
///
/// Takes the model's turn from `model_output` (merging a stream if needed) and
/// appends it to history. With no model output (a resumed run) it uses the last
/// history message instead and records nothing. The first call, in request order,
/// whose tool name is eligible for direct return sets `pending_direct_return_id`;
/// a turn with no eligible call clears it. All calls then go to the executor, and
/// the results (one per call, in request order) are left in `tool_results`.
pub struct ToolsNode {
    executor: Arc<dyn ToolExecutor>,
    return_directly: HashSet<String>,
}

impl ToolsNode {
    pub fn new(executor: Arc<dyn ToolExecutor>, return_directly: HashSet<String>) -> Self {
        Self {
            executor,
            return_directly,
        }
    }

    async fn take_assistant_turn(&self, state: &mut ReActState) -> Result<Message, AgentError> {
        match state.model_output.take() {
            Some(output) => {
                let message = output.into_message().await?;
                state.conversation.history.push(message.clone());
                Ok(message)
            }
            None => state.conversation.history.last().cloned().ok_or_else(|| {
                AgentError::ExecutionFailed(
                    "tool stage has no model output and history is empty".to_string(),
                )
            }),
        }
    }
}

#[async_trait]
impl Node<ReActState> for ToolsNode {
    fn id(&self) -> &str {
        NODE_TOOLS
    }

    fn name(&self) -> &str {
        "Tools"
    }

    async fn run(&self, state: ReActState) -> Result<(ReActState, Next), AgentError> {
        self.run_with_context(state, &RunContext::default()).await
    }

    async fn run_with_context(
        &self,
        mut state: ReActState,
        ctx: &RunContext,
    ) -> Result<(ReActState, Next), AgentError> {
        let assistant = self.take_assistant_turn(&mut state).await?;
        let tool_calls = assistant.tool_calls();

        let marker = tool_calls
            .iter()
            .find(|tc| self.return_directly.contains(&tc.name))
            .map(|tc| tc.id.clone());
        match &marker {
            Some(id) => debug!(call_id = %id, "direct-return marker set"),
            None if state.conversation.pending_direct_return_id.is_some() => {
                debug!("direct-return marker cleared")
            }
            None => {}
        }
        state.conversation.pending_direct_return_id = marker;

        debug!(call_count = tool_calls.len(), "executing tool calls");
        state.tool_results = self.executor.execute(tool_calls, &ctx.cancellation).await?;
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;
    use crate::state::{ConversationState, ModelOutput};
    use crate::stream::{MessageChunk, MessageStream, ToolCallChunk};
    use crate::tools::{MockTool, ToolRegistry};

    async fn registry() -> Arc<dyn ToolExecutor> {
        Arc::new(
            ToolRegistry::resolve(vec![
                Arc::new(MockTool::new("search", "result")),
                Arc::new(MockTool::new("lookup", "found")),
            ])
            .await
            .unwrap(),
        )
    }

    fn turn(calls: Vec<ToolCall>) -> ReActState {
        let mut state = ReActState::default();
        state.model_output = Some(ModelOutput::Message(Message::assistant_with_tool_calls(
            "", calls,
        )));
        state
    }

    /// **Scenario**: the assistant turn is recorded and each call yields a result tagged with its id.
    #[tokio::test]
    async fn records_turn_and_executes_calls() {
        let node = ToolsNode::new(registry().await, HashSet::new());
        let state = turn(vec![
            ToolCall::new("c1", "search", "{}"),
            ToolCall::new("c2", "lookup", "{}"),
        ]);
        let (state, _) = node.run(state).await.unwrap();
        assert_eq!(state.conversation.history.len(), 1);
        assert_eq!(
            state.tool_results,
            vec![Message::tool("c1", "result"), Message::tool("c2", "found")]
        );
        assert!(state.conversation.pending_direct_return_id.is_none());
    }

    /// **Scenario**: only the first eligible call in request order becomes the marker.
    #[tokio::test]
    async fn marks_first_eligible_call_only() {
        let eligible: HashSet<String> = ["search", "lookup"].iter().map(|s| s.to_string()).collect();
        let node = ToolsNode::new(registry().await, eligible);
        let state = turn(vec![
            ToolCall::new("c1", "lookup", "{}"),
            ToolCall::new("c2", "search", "{}"),
        ]);
        let (state, _) = node.run(state).await.unwrap();
        assert_eq!(state.conversation.pending_direct_return_id.as_deref(), Some("c1"));
    }

    /// **Scenario**: a turn without eligible calls clears a stale marker.
    #[tokio::test]
    async fn clears_marker_without_eligible_call() {
        let eligible: HashSet<String> = ["lookup".to_string()].into_iter().collect();
        let node = ToolsNode::new(registry().await, eligible);
        let mut state = turn(vec![ToolCall::new("c2", "search", "{}")]);
        state.conversation.pending_direct_return_id = Some("old".into());
        let (state, _) = node.run(state).await.unwrap();
        assert!(state.conversation.pending_direct_return_id.is_none());
    }

    /// **Scenario**: with no model output the last history message is used and not appended again.
    #[tokio::test]
    async fn resumed_run_uses_last_history_message() {
        let node = ToolsNode::new(registry().await, HashSet::new());
        let conversation = ConversationState {
            history: vec![
                Message::user("find it"),
                Message::assistant_with_tool_calls("", vec![ToolCall::new("c9", "search", "{}")]),
            ],
            pending_direct_return_id: None,
        };
        let (state, _) = node.run(ReActState::new(conversation, vec![])).await.unwrap();
        assert_eq!(state.conversation.history.len(), 2);
        assert_eq!(state.tool_results, vec![Message::tool("c9", "result")]);
    }

    /// **Scenario**: no model output and an empty history is an execution error.
    #[tokio::test]
    async fn resumed_run_with_empty_history_fails() {
        let node = ToolsNode::new(registry().await, HashSet::new());
        let err = node.run(ReActState::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutionFailed(_)));
    }

    /// **Scenario**: a streamed turn with split arguments is merged before execution.
    #[tokio::test]
    async fn streamed_turn_is_merged() {
        let tool = Arc::new(MockTool::new("search", "ok"));
        let executor: Arc<dyn ToolExecutor> =
            Arc::new(ToolRegistry::resolve(vec![tool.clone()]).await.unwrap());
        let node = ToolsNode::new(executor, HashSet::new());
        let piece = |id: &str, name: &str, args: &str| ToolCallChunk {
            index: Some(0),
            id: id.into(),
            name: name.into(),
            arguments: args.into(),
            ..ToolCallChunk::default()
        };
        let mut state = ReActState::default();
        state.model_output = Some(ModelOutput::Stream(MessageStream::from_chunks(vec![
            MessageChunk::tool_calls(vec![piece("c1", "search", "{\"q\":")]),
            MessageChunk::tool_calls(vec![piece("", "", "\"rust\"}")]),
        ])));
        let (state, _) = node.run(state).await.unwrap();
        assert_eq!(state.tool_results, vec![Message::tool("c1", "ok")]);
        assert_eq!(tool.calls()[0].1, serde_json::json!({"q": "rust"}));
    }
}
