//! Incremental model output: fragments and the single-pass reader that carries them.
//!
//! A model turn delivered as a stream is a finite sequence of [`MessageChunk`]s in
//! delivery order. [`MessageStream`] is the reader half: it is consumed once, and
//! dropping it (or calling [`MessageStream::close`]) releases the channel so the
//! producer stops. Because readers take the stream by value, every exit path (early
//! return, `?`, cancellation dropping the future) releases it.
//!
//! ```rust,ignore
//! use weft::stream::{MessageChunk, MessageStream};
//!
//! let (tx, stream) = MessageStream::channel();
//! tx.send(MessageChunk::text("Hel"));
//! tx.send(MessageChunk::text("lo"));
//! drop(tx);
//! let message = stream.concat().await?;
//! assert_eq!(message.content(), "Hello");
//! ```

mod concat;

pub use concat::concat_chunks;

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{future, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::error::AgentError;
use crate::message::{Message, Role};

/// One piece of a tool call inside a fragment.
///
/// `index` identifies which call of the turn this piece belongs to; pieces with the
/// same index are merged. Pieces without an index are complete calls on their own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// One incremental fragment of a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageChunk {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallChunk>,
    /// Set on fragments of a tool result message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl MessageChunk {
    /// Assistant text fragment.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Assistant fragment carrying tool call pieces only.
    pub fn tool_calls(tool_calls: Vec<ToolCallChunk>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }

    /// True when the fragment has neither text nor tool calls (a priming fragment).
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.tool_calls.is_empty()
    }

    /// Whole message as a single fragment; tool calls are indexed by position.
    pub fn from_message(message: &Message) -> Self {
        let tool_calls = message
            .tool_calls()
            .iter()
            .enumerate()
            .map(|(i, tc)| ToolCallChunk {
                index: Some(i),
                id: tc.id.clone(),
                kind: tc.kind.clone(),
                name: tc.name.clone(),
                arguments: tc.arguments.clone(),
            })
            .collect();
        Self {
            role: message.role(),
            content: message.content().to_string(),
            tool_calls,
            tool_call_id: message.tool_call_id().map(str::to_string),
        }
    }
}

/// Item yielded by a [`MessageStream`]: a fragment, or the error that ended the read.
pub type StreamItem = Result<MessageChunk, AgentError>;

/// Producer half of a [`MessageStream`].
#[derive(Clone, Debug)]
pub struct MessageStreamSender {
    tx: mpsc::UnboundedSender<StreamItem>,
}

impl MessageStreamSender {
    /// Sends one fragment. Returns false once the reader has been released.
    pub fn send(&self, chunk: MessageChunk) -> bool {
        self.tx.send(Ok(chunk)).is_ok()
    }

    /// Sends a read failure; readers surface it as the error of their read.
    pub fn send_error(&self, error: AgentError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// True once the reader has been dropped or closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Single-pass reader of one message's fragments.
pub struct MessageStream {
    inner: UnboundedReceiverStream<StreamItem>,
}

impl MessageStream {
    /// Creates a connected sender/reader pair.
    pub fn channel() -> (MessageStreamSender, MessageStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            MessageStreamSender { tx },
            MessageStream {
                inner: UnboundedReceiverStream::new(rx),
            },
        )
    }

    /// A finished stream that yields `chunks` in order.
    pub fn from_chunks(chunks: Vec<MessageChunk>) -> Self {
        let (tx, stream) = Self::channel();
        for chunk in chunks {
            tx.send(chunk);
        }
        stream
    }

    /// A finished stream with the whole message as one fragment.
    pub fn from_message(message: &Message) -> Self {
        Self::from_chunks(vec![MessageChunk::from_message(message)])
    }

    /// Reads the next fragment; `None` when the producer is done.
    pub async fn recv(&mut self) -> Option<StreamItem> {
        self.inner.next().await
    }

    /// Releases the stream without reading the rest.
    pub fn close(mut self) {
        self.inner.close();
    }

    /// Drains the stream and merges every fragment into one message.
    pub async fn concat(mut self) -> Result<Message, AgentError> {
        let mut chunks = Vec::new();
        while let Some(item) = self.recv().await {
            chunks.push(item?);
        }
        if chunks.is_empty() {
            return Err(AgentError::StreamRead(
                "stream produced no fragments".to_string(),
            ));
        }
        Ok(concat_chunks(&chunks))
    }

    /// Splits the stream into two readers that each see every item.
    ///
    /// A background task forwards items until both copies are released or the
    /// source ends. Copies are unbounded so one reader never waits on the other.
    /// Once both copies are gone the source is dropped, even while it is idle, so
    /// its producer sees [`MessageStreamSender::is_closed`].
    pub fn tee(mut self) -> (MessageStream, MessageStream) {
        let (left_tx, left) = Self::channel();
        let (right_tx, right) = Self::channel();
        tokio::spawn(async move {
            let mut left_open = true;
            let mut right_open = true;
            loop {
                let released = future::join(left_tx.tx.closed(), right_tx.tx.closed());
                let item = tokio::select! {
                    item = self.recv() => item,
                    _ = released => {
                        tracing::trace!("tee copies released, dropping source stream");
                        break;
                    }
                };
                let Some(item) = item else { break };
                if left_open {
                    left_open = left_tx.tx.send(item.clone()).is_ok();
                }
                if right_open {
                    right_open = right_tx.tx.send(item).is_ok();
                }
                if !left_open && !right_open {
                    break;
                }
            }
        });
        (left, right)
    }
}

impl Stream for MessageStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStream").finish_non_exhaustive()
    }
}
