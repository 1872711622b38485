//! Construction-time configuration of a ReAct agent.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::llm::LlmClient;
use crate::message::Message;
use crate::tools::{Tool, ToolExecutor};

use super::detector::StreamToolCallDetector;
use super::settings::ReactSettings;

/// Rewrites the message list the model sees on each turn.
///
/// Receives a copy of history; whatever it returns goes to the model and is never
/// written back to history.
pub type MessageModifier = Arc<dyn Fn(Vec<Message>) -> Vec<Message> + Send + Sync>;

/// Modifier that puts a system message with `persona` in front of the model input.
pub fn persona_modifier(persona: impl Into<String>) -> MessageModifier {
    let persona = persona.into();
    Arc::new(move |messages: Vec<Message>| {
        let mut out = Vec::with_capacity(messages.len() + 1);
        out.push(Message::system(persona.clone()));
        out.extend(messages);
        out
    })
}

/// Configuration for [`ReactAgent::new`](super::ReactAgent::new).
///
/// Immutable once the agent is built; one agent serves many runs.
///
/// - `model`: required.
/// - `tools`: the catalog; every tool's `info()` is called once at build time.
/// - `max_step`: node executions per run; unset means node count + 10.
/// - `tool_return_directly`: tool names whose result ends the run; each must be in the catalog.
/// - `stream_tool_call_checker`: defaults to the early-exit [`FirstChunkDetector`](super::FirstChunkDetector).
/// - `tool_executor`: replaces the built-in registry for execution (the catalog
///   still comes from `tools`).
/// - `execute_sequentially`: run one turn's tool calls in order instead of concurrently.
#[derive(Clone, Default)]
pub struct ReactAgentConfig {
    pub model: Option<Arc<dyn LlmClient>>,
    pub tools: Vec<Arc<dyn Tool>>,
    pub message_modifier: Option<MessageModifier>,
    pub max_step: Option<usize>,
    pub tool_return_directly: HashSet<String>,
    pub stream_tool_call_checker: Option<Arc<dyn StreamToolCallDetector>>,
    pub tool_executor: Option<Arc<dyn ToolExecutor>>,
    pub execute_sequentially: bool,
}

impl ReactAgentConfig {
    pub fn new(model: Arc<dyn LlmClient>) -> Self {
        Self {
            model: Some(model),
            ..Self::default()
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn with_message_modifier(mut self, modifier: MessageModifier) -> Self {
        self.message_modifier = Some(modifier);
        self
    }

    pub fn with_max_step(mut self, max_step: usize) -> Self {
        self.max_step = Some(max_step);
        self
    }

    /// Marks `name` as a direct-return tool.
    pub fn with_return_directly(mut self, name: impl Into<String>) -> Self {
        self.tool_return_directly.insert(name.into());
        self
    }

    pub fn with_stream_tool_call_checker(
        mut self,
        detector: Arc<dyn StreamToolCallDetector>,
    ) -> Self {
        self.stream_tool_call_checker = Some(detector);
        self
    }

    pub fn with_tool_executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.tool_executor = Some(executor);
        self
    }

    pub fn with_execute_sequentially(mut self, execute_sequentially: bool) -> Self {
        self.execute_sequentially = execute_sequentially;
        self
    }

    /// Merges plain-data settings: set values override, direct-return names are added.
    pub fn apply_settings(mut self, settings: &ReactSettings) -> Self {
        if let Some(max_step) = settings.max_step {
            self.max_step = Some(max_step);
        }
        self.tool_return_directly
            .extend(settings.tool_return_directly.iter().cloned());
        if let Some(kind) = settings.stream_detector {
            self.stream_tool_call_checker = Some(kind.build());
        }
        if let Some(sequential) = settings.execute_sequentially {
            self.execute_sequentially = sequential;
        }
        self
    }
}

impl fmt::Debug for ReactAgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactAgentConfig")
            .field("has_model", &self.model.is_some())
            .field("tool_count", &self.tools.len())
            .field("has_message_modifier", &self.message_modifier.is_some())
            .field("max_step", &self.max_step)
            .field("tool_return_directly", &self.tool_return_directly)
            .field("has_custom_detector", &self.stream_tool_call_checker.is_some())
            .field("has_custom_executor", &self.tool_executor.is_some())
            .field("execute_sequentially", &self.execute_sequentially)
            .finish()
    }
}
