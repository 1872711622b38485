//! ReAct: the chat/tools loop with optional direct return.
//!
//! # Main types
//!
//! - **[`ReactAgent`]**: builds the graph once from a [`ReactAgentConfig`]; runs it with
//!   [`generate`](ReactAgent::generate), [`stream`](ReactAgent::stream) or
//!   [`resume`](ReactAgent::resume).
//! - **[`ChatModelNode`]** (`chat`): records input, calls the model.
//! - **[`ToolsNode`]** (`tools`): records the assistant turn, marks a direct-return call,
//!   executes tools.
//! - **[`DirectReturnNode`]** (`direct_return`): ends the run with the marked tool result.
//! - **[`ModelBranch`]** / **[`ToolsBranch`]**: routing after `chat` and after `tools`.
//! - **[`StreamToolCallDetector`]**: [`FirstChunkDetector`] (early exit, default) or
//!   [`FullConsumeDetector`].
//! - **[`ReactSettings`]**: data-driven settings from env / `.env`.

mod agent;
mod branch;
mod config;
mod detector;
mod direct_return;
mod error;
mod model_node;
mod options;
mod settings;
mod tools_node;

pub use agent::{ReactAgent, ReactRun};
pub use branch::{ModelBranch, ToolsBranch};
pub use config::{persona_modifier, MessageModifier, ReactAgentConfig};
pub use detector::{DetectorKind, FirstChunkDetector, FullConsumeDetector, StreamToolCallDetector};
pub use direct_return::DirectReturnNode;
pub use error::BuildError;
pub use model_node::ChatModelNode;
pub use options::RunOptions;
pub use settings::{
    ReactSettings, SettingsError, ENV_EXECUTE_SEQUENTIALLY, ENV_MAX_STEP, ENV_RETURN_DIRECTLY,
    ENV_STREAM_DETECTOR,
};
pub use tools_node::ToolsNode;

/// Graph name of the ReAct loop.
pub const GRAPH_NAME: &str = "ReActAgent";
/// Node id of the chat stage.
pub const NODE_CHAT: &str = "chat";
/// Node id of the tool stage.
pub const NODE_TOOLS: &str = "tools";
/// Node id of the direct-return stage.
pub const NODE_DIRECT_RETURN: &str = "direct_return";
