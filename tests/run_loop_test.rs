mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cmdassist::adapters::{AlwaysDecline, AutoConfirm};
use cmdassist::agents::core::{AskOptions, Assistant};
use cmdassist::agents::error::AgentError;
use cmdassist::domain::{
    MessageContent, RequiredToolCall, RunStatus, TextContent, ThreadMessage, ToolOutput,
};
use common::{config, demo_tools, requires_action, run, ScriptedService};
use serde_json::json;

fn assistant(service: &Arc<ScriptedService>, counter: &Arc<AtomicUsize>) -> Assistant {
    Assistant::new(service.clone(), config("demo"), demo_tools(counter))
        .with_confirmer(Arc::new(AutoConfirm))
}

#[tokio::test(start_paused = true)]
async fn test_completes_without_tool_calls() {
    let service = ScriptedService::new();
    service.script([
        run(RunStatus::Queued),
        run(RunStatus::InProgress),
        run(RunStatus::Completed),
    ]);
    service.reply_text("Hello there");
    let counter = Arc::new(AtomicUsize::new(0));

    let start = tokio::time::Instant::now();
    let reply = assistant(&service, &counter)
        .ask("hi", AskOptions::default())
        .await
        .unwrap();

    assert_eq!(reply, "Hello there");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(service.count("retrieve_run"), 3);
    assert!(service.submitted().is_empty());
    assert_eq!(service.messages()[0].content, "hi");
    assert_eq!(service.messages()[0].role, "user");

    // Every status check follows a full poll interval
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(9));
    assert!(elapsed < Duration::from_secs(12));
}

#[tokio::test(start_paused = true)]
async fn test_single_tool_round_submits_once() {
    let service = ScriptedService::new();
    service.script([
        requires_action(vec![RequiredToolCall::function(
            "call_abc",
            "demo.say_hello",
            r#"{"name": "Ada"}"#,
        )]),
        run(RunStatus::InProgress),
        run(RunStatus::Completed),
    ]);
    service.reply_text("I greeted Ada.");
    let counter = Arc::new(AtomicUsize::new(0));

    let reply = assistant(&service, &counter)
        .ask("greet Ada", AskOptions::default())
        .await
        .unwrap();

    assert_eq!(reply, "I greeted Ada.");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(
        service.submitted(),
        vec![vec![ToolOutput {
            tool_call_id: "call_abc".to_string(),
            output: "Output::\nHello, Ada!".to_string(),
        }]]
    );
}

#[tokio::test(start_paused = true)]
async fn test_batch_runs_in_order_and_keeps_call_ids() {
    let service = ScriptedService::new();
    service.script([
        requires_action(vec![
            RequiredToolCall::function("call_2", "demo.math.add", r#"{"a": "2", "b": 3}"#),
            RequiredToolCall::function("call_1", "say_hello", r#"{"name": "Bob"}"#),
        ]),
        run(RunStatus::Completed),
    ]);
    service.reply_text("done");
    let counter = Arc::new(AtomicUsize::new(0));

    assistant(&service, &counter)
        .ask("add and greet", AskOptions::default())
        .await
        .unwrap();

    let submitted = service.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0][0].tool_call_id, "call_2");
    assert_eq!(submitted[0][0].output, "5");
    assert_eq!(submitted[0][1].tool_call_id, "call_1");
    assert_eq!(submitted[0][1].output, "Output::\nHello, Bob!");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_failure_statuses() {
    for (status, expected) in [
        (RunStatus::Failed, "failed"),
        (RunStatus::Expired, "expired"),
        (RunStatus::Cancelled, "cancelled"),
        (RunStatus::Cancelling, "cancelling"),
    ] {
        let service = ScriptedService::new();
        service.script([run(RunStatus::InProgress), run(status)]);
        let counter = Arc::new(AtomicUsize::new(0));

        let err = assistant(&service, &counter)
            .ask("hi", AskOptions::default())
            .await
            .unwrap_err();
        match err {
            AgentError::RunFailed { status } => assert_eq!(status, expected),
            other => panic!("expected run failure, got {:?}", other),
        }
        assert_eq!(service.count("retrieve_run"), 2);
    }
}

#[tokio::test(start_paused = true)]
async fn test_unknown_status_is_unexpected() {
    let service = ScriptedService::new();
    service.script([run(RunStatus::from("incomplete"))]);
    let counter = Arc::new(AtomicUsize::new(0));

    let err = assistant(&service, &counter)
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::UnexpectedStatus(status) if status == "incomplete"));
}

#[tokio::test(start_paused = true)]
async fn test_times_out_after_max_iterations() {
    let service = ScriptedService::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let err = assistant(&service, &counter)
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Timeout { iterations: 20 }));
    assert_eq!(service.count("retrieve_run"), 20);
    assert_eq!(service.count("list_messages"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_tool_round_resets_iteration_budget() {
    let service = ScriptedService::new();
    service.script(std::iter::repeat_with(|| run(RunStatus::InProgress)).take(19));
    service.script([requires_action(vec![RequiredToolCall::function(
        "call_1",
        "demo.say_hello",
        r#"{"name": "Ada"}"#,
    )])]);
    service.script(std::iter::repeat_with(|| run(RunStatus::InProgress)).take(19));
    service.script([run(RunStatus::Completed)]);
    service.reply_text("finally");
    let counter = Arc::new(AtomicUsize::new(0));

    let reply = assistant(&service, &counter)
        .ask("slow", AskOptions::default())
        .await
        .unwrap();

    assert_eq!(reply, "finally");
    assert_eq!(service.count("retrieve_run"), 40);
}

#[tokio::test(start_paused = true)]
async fn test_tools_disabled_rejects_requires_action() {
    let service = ScriptedService::new();
    service.script([requires_action(vec![RequiredToolCall::function(
        "call_1",
        "demo.say_hello",
        r#"{"name": "Ada"}"#,
    )])]);
    let counter = Arc::new(AtomicUsize::new(0));

    let err = assistant(&service, &counter)
        .ask("hi", AskOptions::default().with_use_commands(false))
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::ToolsDisabled));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert_eq!(service.run_requests()[0].tools, Some(vec![]));
    assert_eq!(service.count("cancel_run"), 1);
    assert!(service.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_request_carries_overrides() {
    let service = ScriptedService::new();
    service.script([run(RunStatus::Completed)]);
    service.reply_text("ok");
    let counter = Arc::new(AtomicUsize::new(0));

    assistant(&service, &counter)
        .ask("hi", AskOptions::default().with_instructions("Answer in French"))
        .await
        .unwrap();

    let request = &service.run_requests()[0];
    assert_eq!(request.instructions.as_deref(), Some("Answer in French"));
    assert_eq!(request.tools, None);
}

#[tokio::test(start_paused = true)]
async fn test_declined_confirmation_runs_nothing() {
    let service = ScriptedService::new();
    service.script([requires_action(vec![
        RequiredToolCall::function("call_1", "demo.say_hello", r#"{"name": "Ada"}"#),
        RequiredToolCall::function("call_2", "demo.math.add", r#"{"a": 1, "b": 2}"#),
    ])]);
    let counter = Arc::new(AtomicUsize::new(0));

    let err = Assistant::new(service.clone(), config("demo"), demo_tools(&counter))
        .with_confirmer(Arc::new(AlwaysDecline))
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::UserAborted));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(service.submitted().is_empty());
    assert_eq!(service.count("cancel_run"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_skipped_when_disabled() {
    let service = ScriptedService::new();
    service.script([
        requires_action(vec![RequiredToolCall::function(
            "call_1",
            "demo.say_hello",
            r#"{"name": "Ada"}"#,
        )]),
        run(RunStatus::Completed),
    ]);
    service.reply_text("ok");
    let counter = Arc::new(AtomicUsize::new(0));

    Assistant::new(service.clone(), config("demo"), demo_tools(&counter))
        .with_confirmer(Arc::new(AlwaysDecline))
        .ask("hi", AskOptions::default().with_confirm_commands(false))
        .await
        .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unresolved_function_fails_batch() {
    let service = ScriptedService::new();
    service.script([requires_action(vec![
        RequiredToolCall::function("call_1", "demo.say_hello", r#"{"name": "Ada"}"#),
        RequiredToolCall::function("call_2", "rm_rf", "{}"),
    ])]);
    let counter = Arc::new(AtomicUsize::new(0));

    let err = assistant(&service, &counter)
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::UnresolvedFunction(name) if name == "rm_rf"));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(service.submitted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_requires_action_without_calls() {
    let service = ScriptedService::new();
    service.script([run(RunStatus::RequiresAction)]);
    let counter = Arc::new(AtomicUsize::new(0));

    let err = assistant(&service, &counter)
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::UnsupportedResponse(_)));
}

#[tokio::test(start_paused = true)]
async fn test_annotated_reply_is_unsupported() {
    let service = ScriptedService::new();
    service.script([run(RunStatus::Completed)]);
    service.reply_with(ThreadMessage {
        id: "msg_1".to_string(),
        role: "assistant".to_string(),
        content: vec![MessageContent::Text {
            text: TextContent {
                value: "See the attached file".to_string(),
                annotations: vec![json!({"type": "file_citation"})],
            },
        }],
    });
    let counter = Arc::new(AtomicUsize::new(0));

    let err = assistant(&service, &counter)
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::UnsupportedResponse(_)));
}

#[tokio::test(start_paused = true)]
async fn test_default_confirmer_declines() {
    let service = ScriptedService::new();
    service.script([requires_action(vec![RequiredToolCall::function(
        "call_1",
        "demo.say_hello",
        r#"{"name": "Ada"}"#,
    )])]);
    let counter = Arc::new(AtomicUsize::new(0));

    let err = Assistant::new(service.clone(), config("demo"), demo_tools(&counter))
        .ask("hi", AskOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::UserAborted));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}
