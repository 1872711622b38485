//! The ReAct agent: builds the chat/tools loop once and runs it per request.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use crate::error::AgentError;
use crate::graph::{CompiledStateGraph, RunMode, StateGraph, END, START};
use crate::message::Message;
use crate::state::{register_state_type, ConversationState, ReActState};
use crate::stream::MessageStream;
use crate::tools::{ToolExecutor, ToolRegistry};

use super::branch::{ModelBranch, ToolsBranch};
use super::config::ReactAgentConfig;
use super::detector::FirstChunkDetector;
use super::direct_return::DirectReturnNode;
use super::error::BuildError;
use super::model_node::ChatModelNode;
use super::options::RunOptions;
use super::tools_node::ToolsNode;
use super::{GRAPH_NAME, NODE_CHAT, NODE_DIRECT_RETURN, NODE_TOOLS};

/// Result of a blocking run: the final message and the run's conversation record.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactRun {
    pub output: Message,
    pub conversation: ConversationState,
}

/// ReAct agent over a compiled graph:
///
/// ```text
/// START → chat ─(tool calls)→ tools → chat …
///              └(no tool calls)→ END
/// ```
///
/// With direct-return tools configured, `tools` instead routes to `direct_return → END`
/// when a marked call was made, and back to `chat` otherwise.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use weft::agent::react::{ReactAgent, ReactAgentConfig, RunOptions};
/// use weft::llm::MockLlm;
/// use weft::Message;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ReactAgentConfig::new(Arc::new(MockLlm::with_no_tool_calls("4")));
/// let agent = ReactAgent::new(config).await?;
/// let answer = agent
///     .generate(vec![Message::user("2+2?")], &RunOptions::default())
///     .await?;
/// assert_eq!(answer.content(), "4");
/// # Ok(())
/// # }
/// ```
pub struct ReactAgent {
    graph: CompiledStateGraph<ReActState>,
}

impl ReactAgent {
    /// Validates the configuration, resolves the tool catalog and compiles the graph.
    pub async fn new(config: ReactAgentConfig) -> Result<Self, BuildError> {
        register_state_type()?;
        let model = config.model.ok_or(BuildError::MissingModel)?;

        let registry = ToolRegistry::resolve(config.tools)
            .await?
            .with_execute_sequentially(config.execute_sequentially);
        let mut return_directly: Vec<&String> = config.tool_return_directly.iter().collect();
        return_directly.sort();
        if let Some(unknown) = return_directly.iter().find(|name| !registry.contains(name)) {
            return Err(BuildError::UnknownReturnDirectlyTool((*unknown).clone()));
        }
        let specs = registry.specs().to_vec();
        let tool_count = specs.len();
        let executor: Arc<dyn ToolExecutor> = match config.tool_executor {
            Some(executor) => executor,
            None => Arc::new(registry),
        };
        let detector = config
            .stream_tool_call_checker
            .unwrap_or_else(|| Arc::new(FirstChunkDetector));
        let direct_return = !config.tool_return_directly.is_empty();

        let mut graph = StateGraph::<ReActState>::new().with_name(GRAPH_NAME);
        if let Some(max_step) = config.max_step {
            graph = graph.with_max_steps(max_step);
        }
        graph.add_node(
            NODE_CHAT,
            Arc::new(ChatModelNode::new(model, specs, config.message_modifier)),
        );
        graph.add_node(
            NODE_TOOLS,
            Arc::new(ToolsNode::new(executor, config.tool_return_directly)),
        );
        graph.add_edge(START, NODE_CHAT);
        graph.add_conditional_edges(
            NODE_CHAT,
            Arc::new(ModelBranch::new(detector)),
            Some(path_map(&[NODE_TOOLS, END])),
        );
        if direct_return {
            graph.add_node(NODE_DIRECT_RETURN, Arc::new(DirectReturnNode));
            graph.add_conditional_edges(
                NODE_TOOLS,
                Arc::new(ToolsBranch),
                Some(path_map(&[NODE_CHAT, NODE_DIRECT_RETURN])),
            );
            graph.add_edge(NODE_DIRECT_RETURN, END);
        } else {
            graph.add_edge(NODE_TOOLS, NODE_CHAT);
        }
        let graph = graph.compile()?;

        info!(
            graph = GRAPH_NAME,
            tool_count,
            direct_return,
            max_steps = graph.max_steps(),
            "react agent built"
        );
        Ok(Self { graph })
    }

    /// The compiled graph, for inspection.
    pub fn graph(&self) -> &CompiledStateGraph<ReActState> {
        &self.graph
    }

    /// Runs to completion and returns the final message.
    pub async fn generate(
        &self,
        input: Vec<Message>,
        options: &RunOptions,
    ) -> Result<Message, AgentError> {
        let conversation = ConversationState::with_capacity(self.graph.max_steps());
        Ok(self.generate_with_state(conversation, input, options).await?.output)
    }

    /// Runs to completion from an existing conversation and returns the output and
    /// the updated record.
    pub async fn generate_with_state(
        &self,
        conversation: ConversationState,
        input: Vec<Message>,
        options: &RunOptions,
    ) -> Result<ReactRun, AgentError> {
        let ctx = options.run_context(RunMode::Invoke);
        let state = ReActState::new(conversation, input);
        let span = info_span!("react_run", run_id = ?options.run_id, mode = "invoke");
        let state = self.graph.invoke(state, &ctx).instrument(span).await?;
        finish(state).await
    }

    /// Runs until the final message starts and returns a reader of its fragments.
    ///
    /// A model answer is delivered as the model streams it; a direct-return result
    /// arrives as a single fragment. The final model answer is not recorded in any
    /// history since it is handed to the caller unread.
    pub async fn stream(
        &self,
        input: Vec<Message>,
        options: &RunOptions,
    ) -> Result<MessageStream, AgentError> {
        let ctx = options.run_context(RunMode::Stream);
        let state = ReActState::new(
            ConversationState::with_capacity(self.graph.max_steps()),
            input,
        );
        let span = info_span!("react_run", run_id = ?options.run_id, mode = "stream");
        let state = self.graph.stream(state, &ctx).instrument(span).await?;
        state
            .final_output
            .map(|output| output.into_stream())
            .ok_or_else(|| AgentError::ExecutionFailed("run ended without output".into()))
    }

    /// Continues a persisted run whose last message is an assistant turn with tool
    /// calls: the run enters at the tool stage, which executes that turn.
    pub async fn resume(
        &self,
        conversation: ConversationState,
        options: &RunOptions,
    ) -> Result<ReactRun, AgentError> {
        match conversation.history.last() {
            Some(last) if !last.tool_calls().is_empty() => {}
            _ => {
                return Err(AgentError::ExecutionFailed(
                    "resume needs a history ending with an assistant tool call turn".into(),
                ))
            }
        }
        let ctx = options
            .run_context(RunMode::Invoke)
            .with_resume_from(NODE_TOOLS);
        let span = info_span!("react_run", run_id = ?options.run_id, mode = "resume");
        let state = self
            .graph
            .invoke(ReActState::new(conversation, Vec::new()), &ctx)
            .instrument(span)
            .await?;
        finish(state).await
    }
}

fn path_map(targets: &[&str]) -> HashMap<String, String> {
    targets
        .iter()
        .map(|t| (t.to_string(), t.to_string()))
        .collect()
}

async fn finish(state: ReActState) -> Result<ReactRun, AgentError> {
    let output = state
        .final_output
        .ok_or_else(|| AgentError::ExecutionFailed("run ended without output".into()))?
        .into_message()
        .await?;
    Ok(ReactRun {
        output,
        conversation: state.conversation,
    })
}
