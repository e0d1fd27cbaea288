//! Error types for the assistant run loop and the remote client

use thiserror::Error;

/// Errors that abort an `ask` invocation
#[derive(Debug, Error)]
pub enum AgentError {
    /// Requested tool matches no local descriptor, even by suffix
    #[error("Function not found: {0}")]
    UnresolvedFunction(String),

    /// Requested tool matches more than one descriptor by suffix
    #[error("Function {name} is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousFunction { name: String, candidates: Vec<String> },

    /// User declined the requested tool calls
    #[error("Tool execution aborted by user")]
    UserAborted,

    /// Run reached a terminal failure status
    #[error("Run failed with status {status}")]
    RunFailed { status: String },

    /// Run reported a status this client does not handle
    #[error("Unexpected run status {0}")]
    UnexpectedStatus(String),

    /// Polling budget exhausted before the run completed
    #[error("Run did not complete within {iterations} polls")]
    Timeout { iterations: u32 },

    /// Final message is not a single plain text block
    #[error("Unsupported response shape: {0}")]
    UnsupportedResponse(String),

    /// Run requested tools although tools were disabled for it
    #[error("Run requested tool calls but commands are disabled")]
    ToolsDisabled,

    /// Run requested a call kind other than a function call
    #[error("Unsupported tool call type: {0}")]
    UnsupportedToolCall(String),

    /// Tool arguments could not be parsed
    #[error("Invalid arguments for {name}: {message}")]
    InvalidArguments { name: String, message: String },

    /// A tool action returned an error
    #[error("Tool {name} failed: {message}")]
    ToolExecution { name: String, message: String },

    /// Remote service error
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the remote assistant service
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP response
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Network(format!("Connection error: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Serialization(err.to_string())
    }
}

/// Result type alias for run loop operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Result type alias for remote service operations
pub type ApiResult<T> = Result<T, ApiError>;
