//! Tool registry: a resolved tool catalog that executes tool calls by name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::message::{Message, ToolCall};
use crate::tool_source::{ToolCallContext, ToolSourceError, ToolSpec};

use super::{Tool, ToolExecutor};

/// Truncates a string for logging, appending "..." if longer than max_len.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Parses a tool call's argument string to JSON.
///
/// Empty arguments become `{}`. Unparseable arguments log a warning and become `{}`.
/// A JSON string that itself holds JSON (double-encoded arguments) is decoded once more.
pub fn parse_tool_arguments(arguments: &str) -> Value {
    let raw = if arguments.trim().is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_str(arguments) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, arguments = %arguments, "tool arguments JSON parse failed, using empty object");
                serde_json::json!({})
            }
        }
    };
    match raw.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(raw),
        None => raw,
    }
}

/// Catalog of tools resolved once at build time.
///
/// `resolve` calls every tool's `info()`, rejects empty and duplicate names, and keeps
/// the specs in catalog order for the model. As a [`ToolExecutor`] it runs the calls of
/// one turn concurrently (or in order with `with_execute_sequentially(true)`) and
/// returns results in request order.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    specs: Vec<ToolSpec>,
    execute_sequentially: bool,
}

impl ToolRegistry {
    /// Resolves the catalog. Fails on the first `info()` error or on a bad name.
    pub async fn resolve(tools: Vec<Arc<dyn Tool>>) -> Result<Self, ToolSourceError> {
        let mut by_name = HashMap::with_capacity(tools.len());
        let mut specs = Vec::with_capacity(tools.len());
        for tool in tools {
            let spec = tool.info().await?;
            if spec.name.trim().is_empty() {
                return Err(ToolSourceError::InvalidInput(
                    "tool info returned an empty name".to_string(),
                ));
            }
            if by_name.contains_key(&spec.name) {
                return Err(ToolSourceError::DuplicateName(spec.name));
            }
            by_name.insert(spec.name.clone(), tool);
            specs.push(spec);
        }
        debug!(tool_count = specs.len(), "tool catalog resolved");
        Ok(Self {
            tools: by_name,
            specs,
            execute_sequentially: false,
        })
    }

    /// Run the calls of one turn one after another instead of concurrently.
    pub fn with_execute_sequentially(mut self, execute_sequentially: bool) -> Self {
        self.execute_sequentially = execute_sequentially;
        self
    }

    /// Specs in catalog order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    async fn call_one(
        &self,
        tc: &ToolCall,
        cancellation: &CancellationToken,
    ) -> Result<Message, AgentError> {
        let tool = self
            .tools
            .get(&tc.name)
            .ok_or_else(|| ToolSourceError::NotFound(tc.name.clone()))?;
        let args = parse_tool_arguments(&tc.arguments);
        let ctx = ToolCallContext::new(tc.id.clone(), cancellation.clone());
        debug!(tool_name = %tc.name, call_id = %tc.id, "calling tool");
        let content = tool.call(args, &ctx).await?;
        trace!(
            tool_name = %tc.name,
            call_id = %tc.id,
            result = %truncate_for_log(&content.text, 200),
            "tool returned"
        );
        Ok(Message::tool(tc.id.clone(), content.text))
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(
        &self,
        tool_calls: &[ToolCall],
        cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, AgentError> {
        if self.execute_sequentially {
            let mut results = Vec::with_capacity(tool_calls.len());
            for tc in tool_calls {
                results.push(self.call_one(tc, cancellation).await?);
            }
            return Ok(results);
        }
        futures::future::try_join_all(tool_calls.iter().map(|tc| self.call_one(tc, cancellation)))
            .await
    }
}
