//! Remote assistant service client
//!
//! The run loop talks to the remote service only through [`AssistantService`].
//! [`OpenAiAssistantsClient`] implements it over the OpenAI Assistants HTTP API.

mod openai;

pub use openai::OpenAiAssistantsClient;

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::error::ApiResult;
use crate::config::OpenAiSettings;
use crate::domain::{
    AssistantCreate, MessageCreate, RemoteAssistant, Run, RunCreate, Thread, ThreadMessage,
    ToolOutput,
};

/// Operations the run loop needs from the remote assistant service
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// List every registered assistant (the service cannot filter by name)
    async fn list_assistants(&self) -> ApiResult<Vec<RemoteAssistant>>;

    async fn create_assistant(&self, request: &AssistantCreate) -> ApiResult<RemoteAssistant>;

    async fn retrieve_assistant(&self, assistant_id: &str) -> ApiResult<RemoteAssistant>;

    async fn delete_assistant(&self, assistant_id: &str) -> ApiResult<()>;

    async fn create_thread(&self) -> ApiResult<Thread>;

    async fn retrieve_thread(&self, thread_id: &str) -> ApiResult<Thread>;

    async fn create_message(&self, thread_id: &str, request: &MessageCreate) -> ApiResult<ThreadMessage>;

    /// List messages of a thread, newest first
    async fn list_messages(&self, thread_id: &str) -> ApiResult<Vec<ThreadMessage>>;

    async fn create_run(&self, thread_id: &str, request: &RunCreate) -> ApiResult<Run>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> ApiResult<Run>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run>;
}

/// Create the default service client from configuration
pub fn create_service(settings: &OpenAiSettings) -> ApiResult<Arc<dyn AssistantService>> {
    let client = OpenAiAssistantsClient::new(settings)?;
    Ok(Arc::new(client))
}
