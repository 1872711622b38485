//! State graph: nodes + explicit edges (from → to) and optional conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START` and
//! `END` for graph entry/exit, and use `add_conditional_edges` to route on state.
//! Then `compile` to get a `CompiledStateGraph`.
//!
//! # Conditional edges
//!
//! From a source node, a [`Router`] is called after the node ran; its key is used as
//! the next node id, or looked up in an optional path map. A node must have either
//! one outgoing `add_edge` or `add_conditional_edges`, not both. Cycles are allowed
//! only through conditional edges, and every run is bounded by a step limit.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, NextEntry, Router};
use crate::graph::node::Node;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)`.
pub const END: &str = "__end__";

/// Extra steps allowed on top of the node count when no step bound is set.
const DEFAULT_EXTRA_STEPS: usize = 10;

/// State graph: nodes plus explicit edges and optional conditional edges.
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>` and `Arc<dyn Router<S>>`; produces
/// `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    name: String,
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Node ids in registration order, for display.
    node_order: Vec<String>,
    /// Edges (from_id, to_id). A node may have one outgoing edge or conditional_edges, not both.
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    max_steps: Option<usize>,
}

impl<S> Default for StateGraph<S>
where
    S: Send + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Send + Debug + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            name: "StateGraph".to_string(),
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            max_steps: None,
        }
    }

    /// Graph name used in logs and by `CompiledStateGraph::name`.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Maximum node executions per run. Unset means node count + 10.
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
            ..self
        }
    }

    /// Adds a node; id must be unique. Replaces if same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), node).is_none() {
            self.node_order.push(id);
        }
        self
    }

    /// Adds an edge from `from_id` to `to_id`.
    ///
    /// Use `START` for graph entry and `END` for graph exit. Both ids (except
    /// START/END) must be registered via `add_node` before `compile()`.
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: the next node is decided by `path`.
    ///
    /// All path_map values must be valid node ids or `END`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "chat",
    ///     Arc::new(ModelBranch::new(detector)),
    ///     Some([("tools".into(), "tools".into()), (END.into(), END.into())].into_iter().collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: Arc<dyn Router<S>>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Builds the executable graph.
    ///
    /// Validates that every edge endpoint exists, that there is exactly one entry
    /// edge, that something reaches END, that no node has both kinds of outgoing
    /// edge, and that purely unconditional wiring forms a chain without cycles.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        if self.max_steps == Some(0) {
            return Err(CompilationError::ZeroMaxSteps);
        }
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(ref path_map) = router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }

        let mut start_edges = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = start_edges.next().ok_or(CompilationError::MissingStart)?;
        if start_edges.next().is_some() {
            return Err(CompilationError::InvalidChain(
                "multiple edges from START (branch)".into(),
            ));
        }

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut linear_next: HashMap<String, String> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f.as_str() != START) {
            if linear_next.insert(from.clone(), to.clone()).is_some() {
                return Err(CompilationError::InvalidChain(format!(
                    "duplicate edge from {} (branch)",
                    from
                )));
            }
        }
        for source in self.conditional_edges.keys() {
            if linear_next.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
        }

        if self.conditional_edges.is_empty() {
            let mut current = first.clone();
            let mut visited = HashSet::new();
            visited.insert(current.clone());
            while let Some(next) = linear_next.get(&current) {
                if next == END {
                    break;
                }
                if !visited.insert(next.clone()) {
                    return Err(CompilationError::InvalidChain("cycle detected".into()));
                }
                current = next.clone();
            }
        }

        let mut next_map: HashMap<String, NextEntry<S>> = linear_next
            .into_iter()
            .map(|(f, t)| (f, NextEntry::Unconditional(t)))
            .collect();
        for (source, router) in self.conditional_edges {
            next_map.insert(source, NextEntry::Conditional(router));
        }

        let max_steps = self
            .max_steps
            .unwrap_or(self.nodes.len() + DEFAULT_EXTRA_STEPS);

        Ok(CompiledStateGraph {
            name: self.name,
            nodes: self.nodes,
            node_order: self.node_order,
            first_node_id: first,
            next_map,
            max_steps,
        })
    }
}
