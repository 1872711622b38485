//! Conversation state and the per-run ReAct graph state.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::Message;
use crate::stream::MessageStream;

use super::registry::{register_state_type, StateTypeError, REACT_STATE_TAG};

/// The record threaded through one run of the loop.
///
/// - `history`: every message sent to or received from the model or a tool, in
///   causal order. Append-only within a run.
/// - `pending_direct_return_id`: id of the tool call whose result ends the run, set
///   by the tool stage and consumed by the direct-return stage.
///
/// This is the persistable part of a run; see [`to_typed`](Self::to_typed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_direct_return_id: Option<String>,
}

/// Tagged envelope for persisting a state shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedState {
    pub type_tag: String,
    pub data: serde_json::Value,
}

impl ConversationState {
    /// Empty state with history pre-sized to `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: Vec::with_capacity(capacity),
            pending_direct_return_id: None,
        }
    }

    /// Encodes the state under its registered type tag.
    pub fn to_typed(&self) -> Result<TypedState, StateTypeError> {
        register_state_type()?;
        let data =
            serde_json::to_value(self).map_err(|e| StateTypeError::Codec(e.to_string()))?;
        Ok(TypedState {
            type_tag: REACT_STATE_TAG.to_string(),
            data,
        })
    }

    /// Decodes a tagged envelope; rejects any other tag.
    pub fn from_typed(typed: &TypedState) -> Result<Self, StateTypeError> {
        if typed.type_tag != REACT_STATE_TAG {
            return Err(StateTypeError::TagMismatch {
                expected: REACT_STATE_TAG.to_string(),
                found: typed.type_tag.clone(),
            });
        }
        serde_json::from_value(typed.data.clone()).map_err(|e| StateTypeError::Codec(e.to_string()))
    }
}

/// Output of the chat stage: a whole message (blocking runs) or a one-shot fragment
/// reader (streaming runs).
#[derive(Debug)]
pub enum ModelOutput {
    Message(Message),
    Stream(MessageStream),
}

impl ModelOutput {
    /// Whole message, draining and merging the stream if needed.
    pub async fn into_message(self) -> Result<Message, AgentError> {
        match self {
            Self::Message(message) => Ok(message),
            Self::Stream(stream) => stream.concat().await,
        }
    }

    /// Fragment reader; a whole message becomes a single fragment.
    pub fn into_stream(self) -> MessageStream {
        match self {
            Self::Message(message) => MessageStream::from_message(&message),
            Self::Stream(stream) => stream,
        }
    }
}

/// Graph state of one ReAct run.
///
/// Stages hand data to each other through the `Option`/`Vec` slots and take what
/// they read, so each value is consumed once:
/// - `pending_input`: caller messages not yet recorded (chat stage drains it).
/// - `model_output`: latest model turn (routers and the tool stage take it).
/// - `tool_results`: results of the latest tool turn (chat or direct-return stage take them).
/// - `final_output`: the run's result, set by the post-model router or the direct-return stage.
#[derive(Debug, Default)]
pub struct ReActState {
    pub conversation: ConversationState,
    pub pending_input: Vec<Message>,
    pub model_output: Option<ModelOutput>,
    pub tool_results: Vec<Message>,
    pub final_output: Option<ModelOutput>,
}

impl ReActState {
    /// State for a new run: `conversation` as the starting record, `input` still to be recorded.
    pub fn new(conversation: ConversationState, input: Vec<Message>) -> Self {
        Self {
            conversation,
            pending_input: input,
            ..Self::default()
        }
    }
}
