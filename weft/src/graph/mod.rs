//! State graph: nodes, edges and conditional edges; compile, then invoke or stream.
//!
//! The ReAct agent is one graph over [`ReActState`](crate::state::ReActState), but the
//! engine is generic over the state type.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod next;
mod node;
mod run_context;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, NextEntry, Router};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_update,
};
pub use next::Next;
pub use node::Node;
pub use run_context::{RunContext, RunMode};
pub use state_graph::{StateGraph, END, START};
