//! Tool-call detection on a model turn delivered as fragments.
//!
//! A detector takes the turn's [`MessageStream`] by value, so the stream is released
//! on every path out of `detect` (answer found, exhaustion, read error, or the
//! future being dropped on cancellation).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::AgentError;
use crate::stream::{concat_chunks, MessageStream};

/// Decides whether one model turn asks for tool calls.
///
/// Called at most once per turn. Read failures are returned as the error and end the run.
#[async_trait]
pub trait StreamToolCallDetector: Send + Sync {
    async fn detect(&self, stream: MessageStream) -> Result<bool, AgentError>;
}

/// Early-exit policy: answers from the first fragment that carries anything.
///
/// Skips fragments with neither text nor tool calls. A fragment with tool calls
/// means `true`; a fragment with text (and no tool calls) means `false`; an
/// exhausted stream means `false`. Only correct for models that send tool-call
/// metadata before any text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChunkDetector;

#[async_trait]
impl StreamToolCallDetector for FirstChunkDetector {
    async fn detect(&self, mut stream: MessageStream) -> Result<bool, AgentError> {
        while let Some(item) = stream.recv().await {
            let chunk = item?;
            if !chunk.tool_calls.is_empty() {
                trace!("first non-empty fragment carries tool calls");
                stream.close();
                return Ok(true);
            }
            if !chunk.content.is_empty() {
                trace!("first non-empty fragment is text");
                stream.close();
                return Ok(false);
            }
        }
        Ok(false)
    }
}

/// Full-consume policy: reads the whole turn, merges it, and checks the merged message.
///
/// Correct for models that write text before their tool calls, at the cost of
/// buffering the whole turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullConsumeDetector;

#[async_trait]
impl StreamToolCallDetector for FullConsumeDetector {
    async fn detect(&self, mut stream: MessageStream) -> Result<bool, AgentError> {
        let mut chunks = Vec::new();
        while let Some(item) = stream.recv().await {
            chunks.push(item?);
        }
        Ok(!concat_chunks(&chunks).tool_calls().is_empty())
    }
}

/// Named detector policy, for settings and env configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    #[default]
    FirstChunk,
    FullConsume,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstChunk => "first_chunk",
            Self::FullConsume => "full_consume",
        }
    }

    pub fn build(&self) -> Arc<dyn StreamToolCallDetector> {
        match self {
            Self::FirstChunk => Arc::new(FirstChunkDetector),
            Self::FullConsume => Arc::new(FullConsumeDetector),
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first_chunk" => Ok(Self::FirstChunk),
            "full_consume" => Ok(Self::FullConsume),
            _ => Err(format!(
                "unknown stream detector: {} (use first_chunk or full_consume)",
                s
            )),
        }
    }
}
