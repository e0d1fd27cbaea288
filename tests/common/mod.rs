//! Shared fixtures: a scripted in-memory assistant service and counting tools

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cmdassist::agents::config::AssistantConfig;
use cmdassist::agents::error::{ApiError, ApiResult};
use cmdassist::agents::llm::AssistantService;
use cmdassist::domain::{
    AssistantCreate, MessageContent, MessageCreate, ParameterSpec, RemoteAssistant,
    RequiredToolCall, Run, RunCreate, RunStatus, TextContent, Thread, ThreadMessage,
    ToolDescriptor, ToolOutput,
};
use serde_json::{json, Value};

pub const THREAD_ID: &str = "thread_1";
pub const RUN_ID: &str = "run_1";

// ============================================================================
// Scripted service
// ============================================================================

/// In-memory [`AssistantService`] replaying scripted run statuses.
///
/// Once the script is exhausted every poll reports `in_progress`.
#[derive(Default)]
pub struct ScriptedService {
    calls: Mutex<Vec<String>>,
    assistants: Mutex<Vec<RemoteAssistant>>,
    created: Mutex<Vec<AssistantCreate>>,
    deleted: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Run>>,
    messages: Mutex<Vec<MessageCreate>>,
    run_requests: Mutex<Vec<RunCreate>>,
    submitted: Mutex<Vec<Vec<ToolOutput>>>,
    reply: Mutex<Option<ThreadMessage>>,
    next_id: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_assistants(assistants: Vec<RemoteAssistant>) -> Arc<Self> {
        let service = Self::default();
        *service.assistants.lock().unwrap() = assistants;
        Arc::new(service)
    }

    /// Queue run states returned by successive polls
    pub fn script(&self, runs: impl IntoIterator<Item = Run>) {
        self.script.lock().unwrap().extend(runs);
    }

    /// Message returned as the newest message of the thread
    pub fn reply_with(&self, message: ThreadMessage) {
        *self.reply.lock().unwrap() = Some(message);
    }

    pub fn reply_text(&self, text: &str) {
        self.reply_with(text_message(text));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == operation)
            .count()
    }

    pub fn created(&self) -> Vec<AssistantCreate> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<MessageCreate> {
        self.messages.lock().unwrap().clone()
    }

    pub fn run_requests(&self) -> Vec<RunCreate> {
        self.run_requests.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<Vec<ToolOutput>> {
        self.submitted.lock().unwrap().clone()
    }

    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl AssistantService for ScriptedService {
    async fn list_assistants(&self) -> ApiResult<Vec<RemoteAssistant>> {
        self.record("list_assistants");
        Ok(self.assistants.lock().unwrap().clone())
    }

    async fn create_assistant(&self, request: &AssistantCreate) -> ApiResult<RemoteAssistant> {
        self.record("create_assistant");
        self.created.lock().unwrap().push(request.clone());
        let assistant = RemoteAssistant {
            id: self.next_id("asst"),
            name: Some(request.name.clone()),
            instructions: Some(request.instructions.clone()),
            model: request.model.clone(),
            tools: request.tools.clone(),
        };
        self.assistants.lock().unwrap().push(assistant.clone());
        Ok(assistant)
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> ApiResult<RemoteAssistant> {
        self.record("retrieve_assistant");
        self.assistants
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == assistant_id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("No assistant found with id '{}'", assistant_id),
            })
    }

    async fn delete_assistant(&self, assistant_id: &str) -> ApiResult<()> {
        self.record("delete_assistant");
        let mut assistants = self.assistants.lock().unwrap();
        let before = assistants.len();
        assistants.retain(|a| a.id != assistant_id);
        if assistants.len() == before {
            return Err(ApiError::Api {
                status: 404,
                message: format!("No assistant found with id '{}'", assistant_id),
            });
        }
        self.deleted.lock().unwrap().push(assistant_id.to_string());
        Ok(())
    }

    async fn create_thread(&self) -> ApiResult<Thread> {
        self.record("create_thread");
        Ok(Thread {
            id: THREAD_ID.to_string(),
        })
    }

    async fn retrieve_thread(&self, thread_id: &str) -> ApiResult<Thread> {
        self.record("retrieve_thread");
        Ok(Thread {
            id: thread_id.to_string(),
        })
    }

    async fn create_message(&self, _thread_id: &str, request: &MessageCreate) -> ApiResult<ThreadMessage> {
        self.record("create_message");
        self.messages.lock().unwrap().push(request.clone());
        Ok(ThreadMessage {
            id: self.next_id("msg"),
            role: request.role.clone(),
            content: vec![text_block(&request.content)],
        })
    }

    async fn list_messages(&self, _thread_id: &str) -> ApiResult<Vec<ThreadMessage>> {
        self.record("list_messages");
        Ok(self.reply.lock().unwrap().clone().into_iter().collect())
    }

    async fn create_run(&self, _thread_id: &str, request: &RunCreate) -> ApiResult<Run> {
        self.record("create_run");
        self.run_requests.lock().unwrap().push(request.clone());
        Ok(Run::new(RUN_ID, RunStatus::Queued))
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> ApiResult<Run> {
        self.record("retrieve_run");
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| Run::new(run_id, RunStatus::InProgress)))
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> ApiResult<Run> {
        self.record("submit_tool_outputs");
        self.submitted.lock().unwrap().push(outputs.to_vec());
        Ok(Run::new(run_id, RunStatus::Queued))
    }

    async fn cancel_run(&self, _thread_id: &str, run_id: &str) -> ApiResult<Run> {
        self.record("cancel_run");
        Ok(Run::new(run_id, RunStatus::Cancelling))
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn run(status: RunStatus) -> Run {
    Run::new(RUN_ID, status)
}

pub fn requires_action(calls: Vec<RequiredToolCall>) -> Run {
    Run::new(RUN_ID, RunStatus::RequiresAction).with_tool_calls(calls)
}

pub fn text_block(value: &str) -> MessageContent {
    MessageContent::Text {
        text: TextContent {
            value: value.to_string(),
            annotations: vec![],
        },
    }
}

pub fn text_message(value: &str) -> ThreadMessage {
    ThreadMessage {
        id: "msg_reply".to_string(),
        role: "assistant".to_string(),
        content: vec![text_block(value)],
    }
}

pub fn remote_assistant(id: &str, name: &str) -> RemoteAssistant {
    RemoteAssistant {
        id: id.to_string(),
        name: Some(name.to_string()),
        instructions: None,
        model: "gpt-4-1106-preview".to_string(),
        tools: vec![],
    }
}

pub fn config(name: &str) -> AssistantConfig {
    AssistantConfig::new(name).with_poll_interval(Duration::from_secs(3))
}

/// `demo.say_hello`: greets `name`, counting invocations
pub fn say_hello(counter: Arc<AtomicUsize>) -> ToolDescriptor {
    ToolDescriptor::from_fn(
        "demo.say_hello",
        "Say hello to someone",
        vec![ParameterSpec::new("name", "Who to greet").required()],
        move |args, out| {
            counter.fetch_add(1, Ordering::SeqCst);
            writeln!(out, "Hello, {}!", args.require("name")?)?;
            Ok(Value::Null)
        },
    )
}

/// `demo.math.add`: returns the sum of `a` and `b`, counting invocations
pub fn add(counter: Arc<AtomicUsize>) -> ToolDescriptor {
    ToolDescriptor::from_fn(
        "demo.math.add",
        "Add two integers",
        vec![
            ParameterSpec::new("a", "First operand").required(),
            ParameterSpec::new("b", "Second operand").required(),
        ],
        move |args, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            let a: i64 = args.require("a")?.parse()?;
            let b: i64 = args.require("b")?.parse()?;
            Ok(json!(a + b))
        },
    )
}

pub fn demo_tools(counter: &Arc<AtomicUsize>) -> Vec<ToolDescriptor> {
    vec![say_hello(counter.clone()), add(counter.clone())]
}
