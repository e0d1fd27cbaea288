//! Assistant lifecycle and the conversation engine
//!
//! An [`Assistant`] pairs a remote assistant resource with the local tools it
//! may call. [`Assistant::ask`] posts a query to a thread, drives the remote
//! run through its status transitions, dispatches any requested tool calls
//! and returns the final text reply.

mod dispatch;
mod run_loop;

pub use dispatch::{dispatch, prepare_calls, resolve, tool_table};
pub use run_loop::{drive_run, RunContext};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::agents::config::AssistantConfig;
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::llm::AssistantService;
use crate::domain::{
    AlwaysDecline, AssistantCreate, Confirmer, MessageContent, MessageCreate, RemoteAssistant,
    RunCreate, Thread, ThreadMessage, ToolDescriptor,
};

/// Options for a single [`Assistant::ask`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskOptions {
    /// Thread to post to; falls back to the assistant's default thread
    pub thread_id: Option<String>,
    /// Offer the local tools to the run
    pub use_commands: bool,
    /// Ask the user before running requested tools
    pub confirm_commands: bool,
    /// Per-run instructions override
    pub instructions: Option<String>,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            thread_id: None,
            use_commands: true,
            confirm_commands: true,
            instructions: None,
        }
    }
}

impl AskOptions {
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_use_commands(mut self, use_commands: bool) -> Self {
        self.use_commands = use_commands;
        self
    }

    pub fn with_confirm_commands(mut self, confirm_commands: bool) -> Self {
        self.confirm_commands = confirm_commands;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// A remote assistant bound to a set of local tools
pub struct Assistant {
    service: Arc<dyn AssistantService>,
    config: AssistantConfig,
    tools: Vec<ToolDescriptor>,
    confirmer: Arc<dyn Confirmer>,
    remote: Option<RemoteAssistant>,
    thread_id: Option<String>,
}

impl Assistant {
    /// Create a handle; the remote assistant is looked up or created on first use.
    ///
    /// Tool calls are declined until a confirmer is set with
    /// [`with_confirmer`](Self::with_confirmer) or confirmation is turned off per ask.
    pub fn new(
        service: Arc<dyn AssistantService>,
        config: AssistantConfig,
        tools: Vec<ToolDescriptor>,
    ) -> Self {
        Self {
            service,
            config,
            tools,
            confirmer: Arc::new(AlwaysDecline),
            remote: None,
            thread_id: None,
        }
    }

    /// Create a handle and resolve the remote assistant immediately
    pub async fn create(
        service: Arc<dyn AssistantService>,
        config: AssistantConfig,
        tools: Vec<ToolDescriptor>,
    ) -> AgentResult<Self> {
        let mut assistant = Self::new(service, config, tools);
        assistant.ensure_remote().await?;
        Ok(assistant)
    }

    /// Bind to an existing remote assistant by id, skipping the name lookup
    pub async fn from_id(
        service: Arc<dyn AssistantService>,
        assistant_id: &str,
        config: AssistantConfig,
        tools: Vec<ToolDescriptor>,
    ) -> AgentResult<Self> {
        let remote = service.retrieve_assistant(assistant_id).await?;
        let mut assistant = Self::new(service, config, tools);
        assistant.remote = Some(remote);
        Ok(assistant)
    }

    pub fn with_confirmer(mut self, confirmer: Arc<dyn Confirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    /// Use an existing thread as the default for [`ask`](Self::ask)
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn tool_schemas(&self) -> Vec<Value> {
        self.tools.iter().map(ToolDescriptor::to_schema).collect()
    }

    /// Id of the remote assistant, if it has been resolved
    pub fn remote_id(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.id.as_str())
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Resolve the remote assistant, creating it on first use
    pub async fn ensure_remote(&mut self) -> AgentResult<&RemoteAssistant> {
        if self.remote.is_none() {
            let remote = self.get_or_create().await?;
            self.remote = Some(remote);
        }
        self.remote
            .as_ref()
            .ok_or_else(|| AgentError::Configuration("assistant not resolved".to_string()))
    }

    /// Find the remote assistant by name, or create it.
    ///
    /// The service has no name filter, so the full listing is scanned. With
    /// `replace` set every match is deleted and a fresh assistant is created.
    async fn get_or_create(&self) -> AgentResult<RemoteAssistant> {
        let existing: Vec<RemoteAssistant> = self
            .service
            .list_assistants()
            .await?
            .into_iter()
            .filter(|a| a.name.as_deref() == Some(self.config.name.as_str()))
            .collect();

        if self.config.replace {
            for assistant in &existing {
                info!(id = %assistant.id, name = %self.config.name, "Replacing assistant");
                self.service.delete_assistant(&assistant.id).await?;
            }
        } else if let Some(assistant) = existing.into_iter().next() {
            info!(id = %assistant.id, name = %self.config.name, "Reusing assistant");
            return Ok(assistant);
        }

        let request = AssistantCreate {
            name: self.config.name.clone(),
            instructions: self.config.instructions.clone(),
            model: self.config.model.clone(),
            tools: self.tool_schemas(),
        };
        let created = self.service.create_assistant(&request).await?;
        info!(id = %created.id, name = %self.config.name, tools = self.tools.len(), "Created assistant");
        Ok(created)
    }

    /// Delete the remote assistant. A missing target is an error.
    pub async fn delete(&mut self) -> AgentResult<()> {
        let remote = self
            .remote
            .take()
            .ok_or_else(|| AgentError::Configuration("assistant has not been created".to_string()))?;
        self.service.delete_assistant(&remote.id).await?;
        info!(id = %remote.id, "Deleted assistant");
        Ok(())
    }

    /// The default thread, created on first use
    pub async fn thread(&mut self) -> AgentResult<Thread> {
        let thread = match &self.thread_id {
            Some(id) => self.service.retrieve_thread(id).await?,
            None => self.service.create_thread().await?,
        };
        self.thread_id = Some(thread.id.clone());
        Ok(thread)
    }

    /// Messages of a thread, newest first
    pub async fn messages(&self, thread_id: &str) -> AgentResult<Vec<ThreadMessage>> {
        Ok(self.service.list_messages(thread_id).await?)
    }

    /// Post a message to a thread without starting a run
    pub async fn add_message(
        &self,
        thread_id: &str,
        message: &MessageCreate,
    ) -> AgentResult<ThreadMessage> {
        Ok(self.service.create_message(thread_id, message).await?)
    }

    /// Post `query` and return the assistant's text reply.
    pub async fn ask(&mut self, query: &str, options: AskOptions) -> AgentResult<String> {
        let assistant_id = self.ensure_remote().await?.id.clone();

        let thread_id = match &options.thread_id {
            Some(id) => self.service.retrieve_thread(id).await?.id,
            None => self.thread().await?.id,
        };

        self.add_message(&thread_id, &MessageCreate::user(query)).await?;

        let request = RunCreate {
            assistant_id,
            instructions: options.instructions.clone(),
            tools: (!options.use_commands).then(Vec::new),
        };
        let run = self.service.create_run(&thread_id, &request).await?;
        debug!(run_id = %run.id, thread_id = %thread_id, "Created run");

        let ctx = RunContext {
            thread_id: &thread_id,
            tools: &self.tools,
            confirmer: self.confirmer.as_ref(),
            use_commands: options.use_commands,
            confirm_commands: options.confirm_commands,
            poll_interval: self.config.poll_interval,
            max_iterations: self.config.max_iterations,
        };
        drive_run(self.service.as_ref(), &ctx, run).await?;

        let messages = self.messages(&thread_id).await?;
        let latest = messages
            .first()
            .ok_or_else(|| AgentError::UnsupportedResponse("thread has no messages".to_string()))?;
        extract_text(latest)
    }
}

/// Text of a reply that is exactly one plain text block without annotations
pub fn extract_text(message: &ThreadMessage) -> AgentResult<String> {
    match message.content.as_slice() {
        [MessageContent::Text { text }] if text.annotations.is_empty() => Ok(text.value.clone()),
        [MessageContent::Text { text }] => Err(AgentError::UnsupportedResponse(format!(
            "text with {} annotations",
            text.annotations.len()
        ))),
        [_] => Err(AgentError::UnsupportedResponse(
            "non-text content block".to_string(),
        )),
        blocks => Err(AgentError::UnsupportedResponse(format!(
            "{} content blocks",
            blocks.len()
        ))),
    }
}
