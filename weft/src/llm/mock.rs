//! Mock LLM for tests and examples.
//!
//! Replays scripted turns. Each turn is a list of fragments; `invoke()` merges a
//! turn into one message, `stream()` yields its fragments as scripted. After the
//! last turn the mock keeps repeating it, so "always call a tool" is a one-turn script.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::{Message, ToolCall};
use crate::stream::{concat_chunks, MessageChunk, MessageStream};
use crate::tool_source::ToolSpec;

/// Mock LLM: scripted assistant turns, recorded inputs.
///
/// **Interaction**: Implements `LlmClient`; used by the chat stage in tests.
pub struct MockLlm {
    turns: Vec<Vec<MessageChunk>>,
    /// When set, every turn fails with this error instead.
    failure: Option<AgentError>,
    /// When true, `stream()` splits text fragments into one fragment per character.
    stream_by_char: bool,
    call_count: AtomicUsize,
    received: Mutex<Vec<Vec<Message>>>,
    tools_seen: Mutex<Vec<ToolSpec>>,
}

impl MockLlm {
    fn from_turns(turns: Vec<Vec<MessageChunk>>) -> Self {
        Self {
            turns,
            failure: None,
            stream_by_char: false,
            call_count: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            tools_seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with plain text and no tool calls (END path).
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted(vec![Message::assistant(content)])
    }

    /// Always requests the same tool call.
    pub fn with_tool_call(call: ToolCall) -> Self {
        Self::scripted(vec![Message::assistant_with_tool_calls("", vec![call])])
    }

    /// First turn requests `call`, every later turn answers `final_text`.
    pub fn first_tools_then_end(call: ToolCall, final_text: impl Into<String>) -> Self {
        Self::scripted(vec![
            Message::assistant_with_tool_calls("", vec![call]),
            Message::assistant(final_text),
        ])
    }

    /// One whole message per turn.
    pub fn scripted(turns: Vec<Message>) -> Self {
        Self::from_turns(
            turns
                .iter()
                .map(|m| vec![MessageChunk::from_message(m)])
                .collect(),
        )
    }

    /// Explicit fragments per turn, delivered as scripted by `stream()`.
    pub fn from_fragments(turns: Vec<Vec<MessageChunk>>) -> Self {
        Self::from_turns(turns)
    }

    /// Every call fails with `error`.
    pub fn failing(error: AgentError) -> Self {
        Self {
            failure: Some(error),
            ..Self::from_turns(Vec::new())
        }
    }

    /// Enable character-by-character streaming of text fragments.
    pub fn with_stream_by_char(mut self) -> Self {
        self.stream_by_char = true;
        self
    }

    /// Number of model turns served so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Message lists received, one per turn.
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Tool catalog passed on the most recent turn.
    pub fn last_tools(&self) -> Vec<ToolSpec> {
        self.tools_seen.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn next_turn(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Vec<MessageChunk>, AgentError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut received) = self.received.lock() {
            received.push(messages.to_vec());
        }
        if let Ok(mut seen) = self.tools_seen.lock() {
            *seen = tools.to_vec();
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let index = n.min(self.turns.len().saturating_sub(1));
        self.turns
            .get(index)
            .cloned()
            .ok_or_else(|| AgentError::ExecutionFailed("mock llm has no scripted turns".into()))
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<Message, AgentError> {
        let turn = self.next_turn(messages, tools)?;
        Ok(concat_chunks(&turn))
    }

    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<MessageStream, AgentError> {
        let turn = self.next_turn(messages, tools)?;
        if !self.stream_by_char {
            return Ok(MessageStream::from_chunks(turn));
        }
        let mut chunks = Vec::new();
        for chunk in turn {
            if chunk.tool_calls.is_empty() && chunk.content.chars().count() > 1 {
                for c in chunk.content.chars() {
                    chunks.push(MessageChunk {
                        content: c.to_string(),
                        ..chunk.clone()
                    });
                }
            } else {
                chunks.push(chunk);
            }
        }
        Ok(MessageStream::from_chunks(chunks))
    }
}
