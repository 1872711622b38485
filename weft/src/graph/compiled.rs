//! Compiled state graph: immutable, bounded by a step limit, cancellable.
//!
//! Built by `StateGraph::compile`. Runs from the entry node (or a resume node); after
//! each node, a conditional router or the node's `Next` picks the next node.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_update,
};
use super::state_graph::END;
use super::{Next, NextEntry, Node, RunContext, RunMode};

/// Compiled graph: immutable structure with `invoke` and `stream` entry points.
///
/// Every node execution counts as one step; a run that would execute more than
/// `max_steps` nodes fails with [`AgentError::StepLimitExceeded`]. Cancelling the
/// run's token aborts the node or router currently awaiting and fails the run with
/// [`AgentError::Cancelled`].
pub struct CompiledStateGraph<S> {
    pub(super) name: String,
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) node_order: Vec<String>,
    /// First node to run (from START).
    pub(super) first_node_id: String,
    /// Node id -> Unconditional(to_id) or Conditional(router).
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) max_steps: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Send + Debug + 'static,
{
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Node ids in registration order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.node_order.iter().map(String::as_str)
    }

    /// Display name of a node, if the id exists.
    pub fn node_name(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name())
    }

    pub fn entry_node(&self) -> &str {
        &self.first_node_id
    }

    /// Shared run loop used by invoke() and stream(); returns the final state and step count.
    async fn run_loop_inner(
        &self,
        mut state: S,
        ctx: &RunContext,
        mut current_id: String,
    ) -> Result<(S, usize), AgentError> {
        let mut steps = 0usize;
        loop {
            if ctx.cancellation.is_cancelled() {
                return Err(AgentError::Cancelled);
            }
            if steps >= self.max_steps {
                tracing::warn!(
                    graph = %self.name,
                    node_id = %current_id,
                    max_steps = self.max_steps,
                    "step limit exceeded"
                );
                return Err(AgentError::StepLimitExceeded(self.max_steps));
            }
            steps += 1;

            let node = self.nodes.get(&current_id).cloned().ok_or_else(|| {
                AgentError::ExecutionFailed(format!("node not found: {}", current_id))
            })?;

            log_node_start(&current_id);
            log_node_state(&current_id, &state);

            let (new_state, next) = tokio::select! {
                biased;
                _ = ctx.cancellation.cancelled() => return Err(AgentError::Cancelled),
                result = node.run_with_context(state, ctx) => result?,
            };
            state = new_state;

            log_node_complete(&current_id, &next);
            log_state_update(&current_id);

            let next_id = match self.next_map.get(&current_id) {
                Some(NextEntry::Conditional(router)) => {
                    let target = tokio::select! {
                        biased;
                        _ = ctx.cancellation.cancelled() => return Err(AgentError::Cancelled),
                        result = router.resolve_next(&mut state, ctx) => result?,
                    };
                    tracing::debug!(from = %current_id, to = %target, "conditional routing");
                    Some(target)
                }
                entry => match next {
                    Next::End => None,
                    Next::Node(id) => Some(id),
                    Next::Continue => match entry {
                        Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                        _ => None,
                    },
                },
            };

            match next_id {
                Some(id) if id != END => current_id = id,
                _ => return Ok((state, steps)),
            }
        }
    }

    /// Runs the graph with the given state until END, a node's `Next::End`, an error,
    /// cancellation, or the step limit.
    ///
    /// Starts at `ctx.resume_from_node_id` when it names a node, otherwise at the entry node.
    pub async fn invoke(&self, state: S, ctx: &RunContext) -> Result<S, AgentError> {
        let current_id = ctx
            .resume_from_node_id
            .as_ref()
            .filter(|id| self.nodes.contains_key(id.as_str()))
            .cloned()
            .unwrap_or_else(|| self.first_node_id.clone());

        log_graph_start(&self.name);
        match self.run_loop_inner(state, ctx, current_id).await {
            Ok((state, steps)) => {
                log_graph_complete(&self.name, steps);
                Ok(state)
            }
            Err(e) => {
                log_graph_error(&self.name, &e);
                Err(e)
            }
        }
    }

    /// Same as `invoke`, with the context switched to [`RunMode::Stream`] so nodes
    /// produce incremental output.
    pub async fn stream(&self, state: S, ctx: &RunContext) -> Result<S, AgentError> {
        let ctx = RunContext {
            mode: RunMode::Stream,
            ..ctx.clone()
        };
        self.invoke(state, &ctx).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::graph::{Router, StateGraph, START};

    struct AddNode {
        id: &'static str,
        delta: i32,
    }

    #[async_trait]
    impl Node<i32> for AddNode {
        fn id(&self) -> &str {
            self.id
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state + self.delta, Next::Continue))
        }
    }

    /// Records the mode it saw by writing 1 (invoke) or 2 (stream).
    struct ModeNode;

    #[async_trait]
    impl Node<i32> for ModeNode {
        fn id(&self) -> &str {
            "mode"
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            Ok((state, Next::Continue))
        }
        async fn run_with_context(&self, _state: i32, ctx: &RunContext) -> Result<(i32, Next), AgentError> {
            let v = if ctx.is_streaming() { 2 } else { 1 };
            Ok((v, Next::Continue))
        }
    }

    struct SlowNode;

    #[async_trait]
    impl Node<i32> for SlowNode {
        fn id(&self) -> &str {
            "slow"
        }
        async fn run(&self, state: i32) -> Result<(i32, Next), AgentError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok((state, Next::Continue))
        }
    }

    /// Loops back to "inc" while state < limit, else END.
    struct UntilAtLeast(i32);

    #[async_trait]
    impl Router<i32> for UntilAtLeast {
        async fn route(&self, state: &mut i32, _ctx: &RunContext) -> Result<String, AgentError> {
            Ok(if *state < self.0 {
                "again".to_string()
            } else {
                END.to_string()
            })
        }
    }

    fn loop_graph(limit: i32, max_steps: Option<usize>) -> CompiledStateGraph<i32> {
        let mut graph = StateGraph::<i32>::new().with_name("loop");
        if let Some(n) = max_steps {
            graph = graph.with_max_steps(n);
        }
        graph.add_node("inc", Arc::new(AddNode { id: "inc", delta: 1 }));
        graph.add_edge(START, "inc");
        graph.add_conditional_edges(
            "inc",
            Arc::new(UntilAtLeast(limit)),
            Some(
                [
                    ("again".to_string(), "inc".to_string()),
                    (END.to_string(), END.to_string()),
                ]
                .into_iter()
                .collect(),
            ),
        );
        graph.compile().expect("graph compiles")
    }

    /// **Scenario**: A linear chain runs every node once in edge order.
    #[tokio::test]
    async fn invoke_linear_chain() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_node("b", Arc::new(AddNode { id: "b", delta: 10 }));
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);
        let compiled = graph.compile().unwrap();
        let out = compiled.invoke(0, &RunContext::default()).await.unwrap();
        assert_eq!(out, 11);
    }

    /// **Scenario**: A conditional loop repeats until the router returns END.
    #[tokio::test]
    async fn invoke_conditional_loop_until_end() {
        let compiled = loop_graph(5, None);
        let out = compiled.invoke(0, &RunContext::default()).await.unwrap();
        assert_eq!(out, 5);
    }

    /// **Scenario**: A loop that needs more node executions than the bound fails with StepLimitExceeded.
    #[tokio::test]
    async fn invoke_step_limit_exceeded() {
        let compiled = loop_graph(100, Some(3));
        let err = compiled.invoke(0, &RunContext::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::StepLimitExceeded(3)));
    }

    /// **Scenario**: A run that needs exactly max_steps node executions succeeds.
    #[tokio::test]
    async fn invoke_exactly_at_step_limit_succeeds() {
        let compiled = loop_graph(3, Some(3));
        assert_eq!(compiled.invoke(0, &RunContext::default()).await.unwrap(), 3);
    }

    /// **Scenario**: stream() switches the mode nodes observe.
    #[tokio::test]
    async fn stream_sets_stream_mode() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("mode", Arc::new(ModeNode));
        graph.add_edge(START, "mode");
        graph.add_edge("mode", END);
        let compiled = graph.compile().unwrap();
        assert_eq!(compiled.invoke(0, &RunContext::default()).await.unwrap(), 1);
        assert_eq!(compiled.stream(0, &RunContext::default()).await.unwrap(), 2);
    }

    /// **Scenario**: resume_from_node_id starts the run at that node.
    #[tokio::test]
    async fn invoke_resumes_from_node() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("a", Arc::new(AddNode { id: "a", delta: 1 }));
        graph.add_node("b", Arc::new(AddNode { id: "b", delta: 10 }));
        graph.add_edge(START, "a");
        graph.add_edge("a", "b");
        graph.add_edge("b", END);
        let compiled = graph.compile().unwrap();
        let ctx = RunContext::default().with_resume_from("b");
        assert_eq!(compiled.invoke(0, &ctx).await.unwrap(), 10);
    }

    /// **Scenario**: Cancelling the token aborts a node that is still running.
    #[tokio::test]
    async fn invoke_cancelled_mid_node() {
        let mut graph = StateGraph::<i32>::new();
        graph.add_node("slow", Arc::new(SlowNode));
        graph.add_edge(START, "slow");
        graph.add_edge("slow", END);
        let compiled = graph.compile().unwrap();
        let token = CancellationToken::new();
        let ctx = RunContext::default().with_cancellation(token.clone());
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = compiled.invoke(0, &ctx).await.unwrap_err();
        assert!(matches!(err, AgentError::Cancelled));
        canceller.await.unwrap();
    }
}
