//! Tracing helpers for the run loop.
//!
//! Run-level events (`graph`, `steps`) go out at `info`/`error`; per-node events at
//! `debug`. Node input state is only logged at `trace` since a ReAct state carries
//! the whole transcript.

use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

pub fn log_graph_start(graph: &str) {
    tracing::info!(graph, "run started");
}

/// `steps` is the number of node executions the run took.
pub fn log_graph_complete(graph: &str, steps: usize) {
    tracing::info!(graph, steps, "run finished");
}

pub fn log_graph_error(graph: &str, error: &AgentError) {
    tracing::error!(graph, %error, "run failed");
}

pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id, "node entered");
}

pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id, state = ?state, "node input");
}

/// Logs the node's own routing hint; conditional edges may still override it.
pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id, ?next, "node left");
}

pub fn log_state_update(node_id: &str) {
    tracing::debug!(node_id, "state handed on");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: every helper runs without a subscriber installed.
    #[test]
    fn helpers_log_without_subscriber() {
        log_graph_start("g");
        log_node_start("chat");
        log_node_state("chat", &vec!["hi"]);
        log_node_complete("chat", &Next::Continue);
        log_state_update("chat");
        log_graph_complete("g", 1);
        log_graph_error("g", &AgentError::StepLimitExceeded(1));
    }
}
