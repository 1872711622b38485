//! Conditional edges: route to the next node based on state.
//!
//! A source node has a [`Router`] that inspects (and may consume parts of) the state
//! after the node ran and returns a key; the key is either used as the next node id
//! or looked up in an optional path map.
//!
//! **Interaction**: Used by `StateGraph::add_conditional_edges` and the
//! `CompiledStateGraph` run loop.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;

use super::RunContext;

/// Decides where a run goes after a node with conditional edges.
///
/// Takes `&mut S` because a decision may consume state, e.g. reading a one-shot
/// response stream and putting back what the next node needs.
#[async_trait]
pub trait Router<S>: Send + Sync
where
    S: Send + Debug + 'static,
{
    async fn route(&self, state: &mut S, ctx: &RunContext) -> Result<String, AgentError>;
}

/// Conditional edge definition: router plus optional path map.
///
/// - When `path_map` is `None`, the router's key is the next node id.
/// - When `path_map` is `Some(map)`, the next node id is `map[key]` if present,
///   otherwise the key itself.
pub struct ConditionalRouter<S> {
    pub(super) path: Arc<dyn Router<S>>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> Clone for ConditionalRouter<S> {
    fn clone(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
            path_map: self.path_map.clone(),
        }
    }
}

impl<S> ConditionalRouter<S>
where
    S: Send + Debug + 'static,
{
    pub fn new(path: Arc<dyn Router<S>>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub async fn resolve_next(&self, state: &mut S, ctx: &RunContext) -> Result<String, AgentError> {
        let key = self.path.route(state, ctx).await?;
        Ok(self
            .path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key))
    }
}

/// How to determine the next node after a given node runs.
pub enum NextEntry<S> {
    /// Single fixed next node (or END). Node's `Next` (Continue/Node/End) is still respected.
    Unconditional(String),
    /// Next node is decided by the router; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}

impl<S> Clone for NextEntry<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Unconditional(id) => Self::Unconditional(id.clone()),
            Self::Conditional(router) => Self::Conditional(router.clone()),
        }
    }
}
