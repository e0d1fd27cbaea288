//! Wire types for the remote assistant service
//!
//! These mirror the assistant, thread, message and run resources the remote
//! service exposes. Only the fields the run loop needs are modelled; unknown
//! fields are ignored on deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool_call::{ToolCall, ToolCallKind};

/// An assistant registered with the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteAssistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub tools: Vec<Value>,
}

/// Request body for creating an assistant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantCreate {
    pub name: String,
    pub instructions: String,
    pub model: String,
    pub tools: Vec<Value>,
}

/// A remotely held conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Request body for appending a message to a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCreate {
    pub role: String,
    pub content: String,
}

impl MessageCreate {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// A message in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// One content block of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

/// Status of a run, as reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Cancelling,
    Cancelled,
    Failed,
    Expired,
    /// Any status this client does not recognise
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Completed => "completed",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Expired => "expired",
            RunStatus::Other(status) => status,
        }
    }
}

impl From<String> for RunStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "completed" => RunStatus::Completed,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "failed" => RunStatus::Failed,
            "expired" => RunStatus::Expired,
            _ => RunStatus::Other(status),
        }
    }
}

impl From<&str> for RunStatus {
    fn from(status: &str) -> Self {
        RunStatus::from(status.to_string())
    }
}

impl From<RunStatus> for String {
    fn from(status: RunStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of an assistant against a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
}

impl Run {
    pub fn new(id: impl Into<String>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            thread_id: String::new(),
            status,
            required_action: None,
        }
    }

    /// Attach a batch of requested tool calls
    pub fn with_tool_calls(mut self, calls: Vec<RequiredToolCall>) -> Self {
        self.required_action = Some(RequiredAction {
            action_type: "submit_tool_outputs".to_string(),
            submit_tool_outputs: Some(SubmitToolOutputsAction { tool_calls: calls }),
        });
        self
    }

    /// Tool calls awaiting local execution, in request order
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.required_action
            .iter()
            .filter_map(|action| action.submit_tool_outputs.as_ref())
            .flat_map(|submit| submit.tool_calls.iter().map(ToolCall::from))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_tool_outputs: Option<SubmitToolOutputsAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitToolOutputsAction {
    #[serde(default)]
    pub tool_calls: Vec<RequiredToolCall>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionPayload>,
}

impl RequiredToolCall {
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: Some(FunctionPayload {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPayload {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

impl From<&RequiredToolCall> for ToolCall {
    fn from(call: &RequiredToolCall) -> Self {
        let kind = match (call.call_type.as_str(), &call.function) {
            ("function", Some(function)) => ToolCallKind::Function {
                name: function.name.clone(),
                arguments: function.arguments.clone(),
            },
            (other, _) => ToolCallKind::Unsupported(other.to_string()),
        };
        ToolCall {
            call_id: call.id.clone(),
            kind,
        }
    }
}

/// Request body for starting a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunCreate {
    pub assistant_id: String,
    /// Overrides the assistant's instructions for this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Overrides the assistant's tools; an empty list disables tool use
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

/// Paginated list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub last_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_status_round_trips_unknown_values() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "status": "incomplete"
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::Other("incomplete".to_string()));
        assert_eq!(run.status.to_string(), "incomplete");
    }

    #[test]
    fn test_run_tool_calls_from_required_action() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [
                        {"id": "call_a", "type": "function", "function": {"name": "app.hello", "arguments": "{\"name\":\"Ada\"}"}},
                        {"id": "call_b", "type": "code_interpreter"}
                    ]
                }
            }
        }))
        .unwrap();

        assert_eq!(run.status, RunStatus::RequiresAction);
        let calls = run.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ToolCall::function("call_a", "app.hello", "{\"name\":\"Ada\"}"));
        assert_eq!(calls[1].kind, ToolCallKind::Unsupported("code_interpreter".to_string()));
    }

    #[test]
    fn test_message_content_blocks() {
        let message: ThreadMessage = serde_json::from_value(json!({
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "text", "text": {"value": "hi", "annotations": []}},
                {"type": "image_file", "image_file": {"file_id": "file_1"}}
            ]
        }))
        .unwrap();

        assert_eq!(
            message.content[0],
            MessageContent::Text {
                text: TextContent { value: "hi".to_string(), annotations: vec![] }
            }
        );
        assert_eq!(message.content[1], MessageContent::Other);
    }

    #[test]
    fn test_run_create_skips_unset_overrides() {
        let body = serde_json::to_value(RunCreate {
            assistant_id: "asst_1".to_string(),
            instructions: None,
            tools: None,
        })
        .unwrap();
        assert_eq!(body, json!({"assistant_id": "asst_1"}));

        let body = serde_json::to_value(RunCreate {
            assistant_id: "asst_1".to_string(),
            instructions: Some("Be brief".to_string()),
            tools: Some(vec![]),
        })
        .unwrap();
        assert_eq!(body["tools"], json!([]));
        assert_eq!(body["instructions"], "Be brief");
    }
}
