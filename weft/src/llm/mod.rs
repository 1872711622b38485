//! Model capability for the ReAct chat stage.
//!
//! The chat stage depends on a callable that, given the message list and the tool
//! catalog, returns the next assistant message either whole (`invoke`) or as an
//! incremental [`MessageStream`] (`stream`). This module defines the trait and a
//! scripted mock.
//!
//! # Streaming Support
//!
//! `stream()` has a default implementation that calls `invoke()` and delivers the
//! whole message as one fragment. Clients that can stream tokens should override it
//! and push fragments through a [`MessageStream::channel`] as they arrive.

mod mock;

pub use mock::MockLlm;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::stream::MessageStream;
use crate::tool_source::ToolSpec;

/// LLM client: given messages and the tool catalog, returns the assistant's reply.
///
/// **Interaction**: Used by the chat stage (`ChatModelNode`); `invoke` in blocking
/// runs, `stream` in streaming runs.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One turn: read messages, return the assistant message (possibly with tool calls).
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec])
        -> Result<Message, AgentError>;

    /// Streaming variant: returns a reader of the assistant message's fragments.
    ///
    /// Default implementation calls `invoke()` and yields the message as one fragment.
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<MessageStream, AgentError> {
        let message = self.invoke(messages, tools).await?;
        Ok(MessageStream::from_message(&message))
    }
}
