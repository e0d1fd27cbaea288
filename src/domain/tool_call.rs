//! Tool call types exchanged with the remote assistant

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call requested by the remote assistant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Opaque id used to correlate the submitted result
    pub call_id: String,
    pub kind: ToolCallKind,
}

/// The kinds of call the remote service can request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallKind {
    /// A function call; `name` is as received and may be truncated
    Function { name: String, arguments: String },
    /// A call type this client does not know how to serve
    Unsupported(String),
}

impl ToolCall {
    pub fn function(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            kind: ToolCallKind::Function {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Output of one tool call, submitted back to the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// Result of executing a tool call locally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id of the tool call this is responding to
    pub call_id: String,
    /// Full name of the tool that ran
    pub function: String,
    /// Direct return value of the action
    pub return_value: Value,
    /// Everything the action wrote to its output, right-trimmed
    pub stdout: String,
}

impl ToolResult {
    /// Render the text the remote assistant receives
    pub fn output(&self) -> String {
        let value = match &self.return_value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };

        match (value, self.stdout.is_empty()) {
            (None, true) => "Success".to_string(),
            (Some(value), true) => value,
            (None, false) => format!("Output::\n{}", self.stdout),
            (Some(value), false) => format!("Result::\n{}\n\nOutput::\n{}", value, self.stdout),
        }
    }

    pub fn to_output(&self) -> ToolOutput {
        ToolOutput {
            tool_call_id: self.call_id.clone(),
            output: self.output(),
        }
    }
}
