//! # Weft
//!
//! A ReAct control loop in Rust: a model and a set of tools exchange messages until
//! the model answers without tool calls, a direct-return tool produces the answer,
//! or the run hits its step bound.
//!
//! ## Design
//!
//! - **One graph per agent**: [`ReactAgent`] compiles a small [`StateGraph`] (`chat`,
//!   `tools`, optionally `direct_return`) once and runs it per request.
//! - **One state per run**: [`ReActState`] is owned by the run loop and handed to one
//!   node at a time, so no locking is needed.
//! - **Streaming-aware routing**: a [`StreamToolCallDetector`] decides from a partial
//!   model stream whether the turn asks for tools.
//! - **Bounded and cancellable**: every run has a step limit and a cancellation token.
//!
//! ## Main modules
//!
//! - [`agent::react`]: [`ReactAgent`], [`ReactAgentConfig`], [`ReactSettings`], [`RunOptions`],
//!   the stage nodes and routers, the detectors.
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Router`], [`RunContext`].
//! - [`state`]: [`ConversationState`], [`ReActState`], state-type registration.
//! - [`stream`]: [`MessageChunk`], [`MessageStream`], [`concat_chunks`].
//! - [`llm`]: [`LlmClient`], [`MockLlm`].
//! - [`tools`] / [`tool_source`]: [`Tool`], [`ToolExecutor`], [`ToolRegistry`], [`ToolSpec`].
//! - [`message`]: [`Message`], [`ToolCall`].
//! - [`error`]: [`AgentError`].

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod state;
pub mod stream;
pub mod tool_source;
pub mod tools;

pub use agent::react::{
    persona_modifier, BuildError, DetectorKind, FirstChunkDetector, FullConsumeDetector,
    MessageModifier, ReactAgent, ReactAgentConfig, ReactRun, ReactSettings, RunOptions,
    StreamToolCallDetector,
};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, Router, RunContext, RunMode, StateGraph,
    END, START,
};
pub use llm::{LlmClient, MockLlm};
pub use message::{Message, Role, ToolCall};
pub use state::{register_state_type, ConversationState, ReActState};
pub use stream::{concat_chunks, MessageChunk, MessageStream, ToolCallChunk};
pub use tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
pub use tools::{MockTool, Tool, ToolExecutor, ToolRegistry};
