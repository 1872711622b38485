//! Fixed-result tool for tests and examples.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};

use super::Tool;

/// Tool that returns a fixed text (or a fixed error) and records every call.
///
/// Recorded calls are `(call_id, args)` pairs in call order.
pub struct MockTool {
    name: String,
    result: Result<String, ToolSourceError>,
    delay: Option<Duration>,
    broken_info: bool,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTool {
    /// Tool named `name` that always returns `result`.
    pub fn new(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: Ok(result.into()),
            delay: None,
            broken_info: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Tool named `name` whose every call fails with `error`.
    pub fn failing(name: impl Into<String>, error: ToolSourceError) -> Self {
        Self {
            result: Err(error),
            ..Self::new(name, "")
        }
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make `info()` fail, so resolving a catalog that contains this tool fails.
    pub fn with_broken_info(mut self) -> Self {
        self.broken_info = true;
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl Tool for MockTool {
    async fn info(&self) -> Result<ToolSpec, ToolSourceError> {
        if self.broken_info {
            return Err(ToolSourceError::InvalidInput(format!(
                "info unavailable for {}",
                self.name
            )));
        }
        Ok(ToolSpec {
            name: self.name.clone(),
            description: Some(format!("Mock tool {}", self.name)),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        })
    }

    async fn call(
        &self,
        args: Value,
        ctx: &ToolCallContext,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((ctx.call_id.clone(), args));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result
            .clone()
            .map(|text| ToolCallContent { text })
    }
}
