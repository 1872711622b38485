//! Integration tests: blocking ReAct runs (generate, generate_with_state, resume).
//!
//! Scripted MockLlm turns and MockTool results; no real model or tools.


use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use weft::{
    persona_modifier, AgentError, ConversationState, Message, MockLlm, MockTool, ReactAgent,
    ReactAgentConfig, RunOptions, Tool, ToolCall, ToolCallContent, ToolCallContext,
    ToolExecutor, ToolSourceError, ToolSpec,
};

fn search_call() -> ToolCall {
    ToolCall::new("c1", "search", r#"{"q":"weather"}"#)
}

/// **Scenario A**: a plain answer ends the run; history is user + assistant.
#[tokio::test]
async fn scenario_a_plain_answer() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("4"));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm.clone()))
        .await
        .unwrap();
    let run = agent
        .generate_with_state(
            ConversationState::default(),
            vec![Message::user("2+2?")],
            &RunOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(run.output, Message::assistant("4"));
    assert_eq!(run.conversation.history.len(), 2);
    assert_eq!(llm.call_count(), 1);
}

/// **Scenario B**: tool call, tool result back to the model, then a plain answer; history length 4.
#[tokio::test]
async fn scenario_b_tool_round_then_answer() {
    let llm = Arc::new(MockLlm::first_tools_then_end(search_call(), "It is sunny."));
    let tool = Arc::new(MockTool::new("search", "result"));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm.clone()).with_tool(tool.clone()))
        .await
        .unwrap();
    let run = agent
        .generate_with_state(
            ConversationState::default(),
            vec![Message::user("weather?")],
            &RunOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(run.output, Message::assistant("It is sunny."));
    let history = &run.conversation.history;
    assert_eq!(history.len(), 4);
    assert_eq!(history[2], Message::tool("c1", "result"));
    assert_eq!(llm.call_count(), 2);
    assert_eq!(llm.received()[1].len(), 3);
    assert_eq!(tool.calls()[0].1, serde_json::json!({"q": "weather"}));
    assert!(run.conversation.pending_direct_return_id.is_none());
}

/// **Scenario C**: the tool is direct-return; its result is the output and the model is called once.
#[tokio::test]
async fn scenario_c_direct_return() {
    let llm = Arc::new(MockLlm::first_tools_then_end(search_call(), "never"));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm.clone())
            .with_tool(Arc::new(MockTool::new("search", "result")))
            .with_return_directly("search"),
    )
    .await
    .unwrap();
    let run = agent
        .generate_with_state(
            ConversationState::default(),
            vec![Message::user("weather?")],
            &RunOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(run.output, Message::tool("c1", "result"));
    assert_eq!(llm.call_count(), 1);
    assert_eq!(run.conversation.history.len(), 3);
    assert!(run.conversation.pending_direct_return_id.is_none());
}

/// **Scenario D**: step bound 1 with a model that always calls a tool fails with StepLimitExceeded.
#[tokio::test]
async fn scenario_d_step_bound_exceeded() {
    let llm = Arc::new(MockLlm::with_tool_call(search_call()));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm)
            .with_tool(Arc::new(MockTool::new("search", "result")))
            .with_max_step(1),
    )
    .await
    .unwrap();
    let err = agent
        .generate(vec![Message::user("loop")], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::StepLimitExceeded(1)), "{:?}", err);
}

/// **Scenario D (default bound)**: an endless tool loop stops at the default bound, not forever.
#[tokio::test]
async fn endless_tool_loop_hits_default_bound() {
    let llm = Arc::new(MockLlm::with_tool_call(search_call()));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm.clone()).with_tool(Arc::new(MockTool::new("search", "result"))),
    )
    .await
    .unwrap();
    let err = agent
        .generate(vec![Message::user("loop")], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::StepLimitExceeded(12)), "{:?}", err);
    assert_eq!(llm.call_count(), 6);
}

/// Executor that runs nothing and returns no results.
struct DropsResults;

#[async_trait]
impl ToolExecutor for DropsResults {
    async fn execute(
        &self,
        _tool_calls: &[ToolCall],
        _cancellation: &CancellationToken,
    ) -> Result<Vec<Message>, AgentError> {
        Ok(Vec::new())
    }
}

/// **Scenario E**: a marked call whose result is missing fails with NoMatchingValue.
#[tokio::test]
async fn scenario_e_missing_direct_return_result() {
    let llm = Arc::new(MockLlm::with_tool_call(search_call()));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm)
            .with_tool(Arc::new(MockTool::new("search", "result")))
            .with_return_directly("search")
            .with_tool_executor(Arc::new(DropsResults)),
    )
    .await
    .unwrap();
    let err = agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, AgentError::NoMatchingValue { ref tool_call_id } if tool_call_id == "c1"),
        "{:?}",
        err
    );
}

/// **Scenario**: with two eligible calls in one turn, only the first one's result is returned.
#[tokio::test]
async fn only_first_direct_return_call_is_honored() {
    let llm = Arc::new(MockLlm::scripted(vec![Message::assistant_with_tool_calls(
        "",
        vec![
            ToolCall::new("c1", "lookup", "{}"),
            ToolCall::new("c2", "search", "{}"),
        ],
    )]));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm)
            .with_tool(Arc::new(MockTool::new("search", "from search")))
            .with_tool(Arc::new(MockTool::new("lookup", "from lookup")))
            .with_return_directly("search")
            .with_return_directly("lookup"),
    )
    .await
    .unwrap();
    let out = agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(out, Message::tool("c1", "from lookup"));
}

/// **Scenario**: direct return configured but not called keeps looping to the model.
#[tokio::test]
async fn direct_return_configured_but_other_tool_called() {
    let llm = Arc::new(MockLlm::first_tools_then_end(search_call(), "done"));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm.clone())
            .with_tool(Arc::new(MockTool::new("search", "result")))
            .with_tool(Arc::new(MockTool::new("finish", "final")))
            .with_return_directly("finish"),
    )
    .await
    .unwrap();
    let out = agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap();
    assert_eq!(out, Message::assistant("done"));
    assert_eq!(llm.call_count(), 2);
}

/// **Scenario**: the persona reaches the model on every turn but never enters history.
#[tokio::test]
async fn persona_is_sent_to_model_not_recorded() {
    let llm = Arc::new(MockLlm::first_tools_then_end(search_call(), "done"));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm.clone())
            .with_tool(Arc::new(MockTool::new("search", "result")))
            .with_message_modifier(persona_modifier("You are concise.")),
    )
    .await
    .unwrap();
    let run = agent
        .generate_with_state(
            ConversationState::default(),
            vec![Message::user("q")],
            &RunOptions::default(),
        )
        .await
        .unwrap();
    for received in llm.received() {
        assert_eq!(received[0], Message::system("You are concise."));
    }
    assert!(run
        .conversation
        .history
        .iter()
        .all(|m| !matches!(m, Message::System { .. })));
}

/// **Scenario**: the model receives the resolved tool catalog.
#[tokio::test]
async fn model_receives_tool_catalog() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("ok"));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm.clone())
            .with_tool(Arc::new(MockTool::new("search", "")))
            .with_tool(Arc::new(MockTool::new("lookup", ""))),
    )
    .await
    .unwrap();
    agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap();
    let names: Vec<String> = llm.last_tools().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["search", "lookup"]);
}

/// **Scenario**: a failing tool aborts the run with its error.
#[tokio::test]
async fn tool_failure_aborts_run() {
    let llm = Arc::new(MockLlm::first_tools_then_end(search_call(), "never"));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm).with_tool(Arc::new(
        MockTool::failing("search", ToolSourceError::Execution("backend down".into())),
    )))
    .await
    .unwrap();
    let err = agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, AgentError::Tool(ToolSourceError::Execution(ref m)) if m == "backend down"),
        "{:?}",
        err
    );
}

/// **Scenario**: a call to a tool outside the catalog fails with NotFound.
#[tokio::test]
async fn unknown_tool_call_fails_with_not_found() {
    let llm = Arc::new(MockLlm::with_tool_call(ToolCall::new("c1", "missing", "{}")));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm)).await.unwrap();
    let err = agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Tool(ToolSourceError::NotFound(_))), "{:?}", err);
}

/// **Scenario**: a model failure aborts the run with its error.
#[tokio::test]
async fn model_failure_aborts_run() {
    let llm = Arc::new(MockLlm::failing(AgentError::ExecutionFailed("rate limited".into())));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm)).await.unwrap();
    let err = agent
        .generate(vec![Message::user("q")], &RunOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("rate limited"));
}

/// **Scenario**: resume executes the pending tool turn and continues to the answer.
#[tokio::test]
async fn resume_executes_pending_tool_turn() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("resumed answer"));
    let tool = Arc::new(MockTool::new("search", "result"));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm.clone()).with_tool(tool.clone()))
        .await
        .unwrap();
    let persisted = ConversationState {
        history: vec![
            Message::user("weather?"),
            Message::assistant_with_tool_calls("", vec![search_call()]),
        ],
        pending_direct_return_id: None,
    };
    let typed = persisted.to_typed().unwrap();
    let restored = ConversationState::from_typed(&typed).unwrap();

    let run = agent.resume(restored, &RunOptions::default()).await.unwrap();
    assert_eq!(run.output, Message::assistant("resumed answer"));
    assert_eq!(tool.call_count(), 1);
    assert_eq!(run.conversation.history.len(), 4);
    assert_eq!(run.conversation.history[2], Message::tool("c1", "result"));
    assert_eq!(llm.call_count(), 1);
}

/// **Scenario**: a later run continues from the previous run's conversation.
#[tokio::test]
async fn generate_with_state_continues_conversation() {
    let llm = Arc::new(MockLlm::scripted(vec![
        Message::assistant("first"),
        Message::assistant("second"),
    ]));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm.clone())).await.unwrap();
    let first = agent
        .generate_with_state(
            ConversationState::default(),
            vec![Message::user("one")],
            &RunOptions::default(),
        )
        .await
        .unwrap();
    let second = agent
        .generate_with_state(
            first.conversation,
            vec![Message::user("two")],
            &RunOptions::default().with_run_id("run-2"),
        )
        .await
        .unwrap();
    assert_eq!(second.output, Message::assistant("second"));
    assert_eq!(second.conversation.history.len(), 4);
    assert_eq!(llm.received()[1].len(), 3);
}

/// **Scenario**: cancelling during a slow tool fails the run with Cancelled.
#[tokio::test]
async fn cancellation_aborts_run() {
    let llm = Arc::new(MockLlm::with_tool_call(search_call()));
    let agent = ReactAgent::new(ReactAgentConfig::new(llm).with_tool(Arc::new(
        MockTool::new("search", "slow").with_delay(Duration::from_secs(30)),
    )))
    .await
    .unwrap();
    let token = CancellationToken::new();
    let options = RunOptions::default().with_cancellation(token.clone());
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });
    let err = agent
        .generate(vec![Message::user("q")], &options)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Cancelled), "{:?}", err);
    canceller.await.unwrap();
}

/// Tool that logs when each call starts and ends.
struct RecordingTool {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Tool for RecordingTool {
    async fn info(&self) -> Result<ToolSpec, ToolSourceError> {
        Ok(ToolSpec {
            name: self.name.to_string(),
            description: None,
            input_schema: serde_json::json!({}),
        })
    }

    async fn call(
        &self,
        _args: Value,
        _ctx: &ToolCallContext,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.log.lock().unwrap().push(format!("start {}", self.name));
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.log.lock().unwrap().push(format!("end {}", self.name));
        Ok(ToolCallContent {
            text: self.name.to_string(),
        })
    }
}

async fn run_two_tools(sequential: bool) -> (Vec<String>, ConversationState) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let llm = Arc::new(MockLlm::scripted(vec![
        Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "a", "{}"), ToolCall::new("c2", "b", "{}")],
        ),
        Message::assistant("done"),
    ]));
    let agent = ReactAgent::new(
        ReactAgentConfig::new(llm)
            .with_tool(Arc::new(RecordingTool {
                name: "a",
                log: log.clone(),
            }))
            .with_tool(Arc::new(RecordingTool {
                name: "b",
                log: log.clone(),
            }))
            .with_execute_sequentially(sequential),
    )
    .await
    .unwrap();
    let run = agent
        .generate_with_state(
            ConversationState::default(),
            vec![Message::user("q")],
            &RunOptions::default(),
        )
        .await
        .unwrap();
    let events = log.lock().unwrap().clone();
    (events, run.conversation)
}

/// **Scenario**: by default one turn's calls run concurrently; results stay in request order.
#[tokio::test]
async fn tools_run_concurrently_by_default() {
    let (events, conversation) = run_two_tools(false).await;
    assert_eq!(&events[..2], &["start a", "start b"]);
    assert_eq!(conversation.history[2], Message::tool("c1", "a"));
    assert_eq!(conversation.history[3], Message::tool("c2", "b"));
}

/// **Scenario**: execute_sequentially runs calls one after another.
#[tokio::test]
async fn tools_run_sequentially_when_configured() {
    let (events, _) = run_two_tools(true).await;
    assert_eq!(events, vec!["start a", "end a", "start b", "end b"]);
}
