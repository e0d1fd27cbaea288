//! OpenAI Assistants API client

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::AssistantService;
use crate::agents::error::{ApiError, ApiResult};
use crate::config::OpenAiSettings;
use crate::domain::{
    AssistantCreate, ListResponse, MessageCreate, RemoteAssistant, Run, RunCreate, Thread,
    ThreadMessage, ToolOutput,
};

/// Page size used when listing resources
const PAGE_LIMIT: u32 = 100;

/// Beta header required by the Assistants endpoints
const ASSISTANTS_BETA: &str = "assistants=v2";

/// Client for the OpenAI Assistants API
pub struct OpenAiAssistantsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiAssistantsClient {
    /// Create a client from configuration.
    ///
    /// The key comes from `api_key` when set, otherwise from the environment
    /// variable named by `api_key_env`.
    pub fn new(settings: &OpenAiSettings) -> ApiResult<Self> {
        let api_key = match &settings.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => env::var(&settings.api_key_env).map_err(|_| {
                ApiError::Authentication(format!(
                    "Environment variable {} not set",
                    settings.api_key_env
                ))
            })?,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        debug!(path, "GET");
        let response = self.request(reqwest::Method::GET, path).query(query).send().await?;
        Self::parse(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self
            .request(reqwest::Method::POST, path)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("Failed to parse response: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct DeletionStatus {
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct SubmitToolOutputs<'a> {
    tool_outputs: &'a [ToolOutput],
}

#[async_trait]
impl AssistantService for OpenAiAssistantsClient {
    async fn list_assistants(&self) -> ApiResult<Vec<RemoteAssistant>> {
        let mut assistants = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let page: ListResponse<RemoteAssistant> = self.get("assistants", &query).await?;
            let next = page.last_id.clone().or_else(|| page.data.last().map(|a| a.id.clone()));
            let has_more = page.has_more;
            assistants.extend(page.data);

            match next {
                Some(cursor) if has_more => after = Some(cursor),
                _ => break,
            }
        }

        Ok(assistants)
    }

    async fn create_assistant(&self, request: &AssistantCreate) -> ApiResult<RemoteAssistant> {
        self.post("assistants", request).await
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> ApiResult<RemoteAssistant> {
        self.get(&format!("assistants/{}", assistant_id), &[]).await
    }

    async fn delete_assistant(&self, assistant_id: &str) -> ApiResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("assistants/{}", assistant_id))
            .send()
            .await?;
        let status: DeletionStatus = Self::parse(response).await?;
        if !status.deleted {
            return Err(ApiError::Parse(format!(
                "Assistant {} was not deleted",
                assistant_id
            )));
        }
        Ok(())
    }

    async fn create_thread(&self) -> ApiResult<Thread> {
        self.post("threads", &json!({})).await
    }

    async fn retrieve_thread(&self, thread_id: &str) -> ApiResult<Thread> {
        self.get(&format!("threads/{}", thread_id), &[]).await
    }

    async fn create_message(&self, thread_id: &str, request: &MessageCreate) -> ApiResult<ThreadMessage> {
        self.post(&format!("threads/{}/messages", thread_id), request).await
    }

    async fn list_messages(&self, thread_id: &str) -> ApiResult<Vec<ThreadMessage>> {
        let query = [("order", "desc".to_string()), ("limit", PAGE_LIMIT.to_string())];
        let page: ListResponse<ThreadMessage> = self
            .get(&format!("threads/{}/messages", thread_id), &query)
            .await?;
        Ok(page.data)
    }

    async fn create_run(&self, thread_id: &str, request: &RunCreate) -> ApiResult<Run> {
        self.post(&format!("threads/{}/runs", thread_id), request).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run> {
        self.get(&format!("threads/{}/runs/{}", thread_id, run_id), &[]).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> ApiResult<Run> {
        self.post(
            &format!("threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
            &SubmitToolOutputs { tool_outputs: outputs },
        )
        .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> ApiResult<Run> {
        self.post(&format!("threads/{}/runs/{}/cancel", thread_id, run_id), &json!({}))
            .await
    }
}
