//! LangGraph HTTP client.

use anyhow::Result;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::debug;

use super::sse::RunStreamParser;
use super::types::{
    Assistant, AssistantSearchRequest, CreateThreadRequest, HistoryResponse, InputMessage,
    RunChunk, RunInput, RunStreamRequest, Thread,
};
use crate::config::{Config, resolve_base_url, resolve_optional};
use crate::error::{GatewayError, GatewayResult};
use crate::types::BackendMessage;

/// Default base URL for a locally running LangGraph server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:2024";

/// Standard User-Agent header for gateway requests to the backend.
pub const USER_AGENT: &str = concat!("knowthyself/", env!("CARGO_PKG_VERSION"));

/// Boxed stream of run chunks.
pub type RunStream = BoxStream<'static, GatewayResult<RunChunk>>;

/// Configuration for the LangGraph client.
#[derive(Debug, Clone)]
pub struct LangGraphConfig {
    pub base_url: String,
    /// Optional API key sent as `X-Api-Key`
    pub api_key: Option<String>,
}

impl LangGraphConfig {
    /// Resolves the backend configuration from the config file and environment.
    ///
    /// Base URL resolution order:
    /// 1. `LANGGRAPH_BASE_URL` env var (if set and non-empty)
    /// 2. `langgraph_base_url` from the config file
    /// 3. Default: `http://localhost:2024`
    ///
    /// The API key comes from `LANGGRAPH_API_KEY`, then the config file, and
    /// is omitted entirely when neither is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = resolve_base_url(
            config.langgraph_base_url.as_deref(),
            "LANGGRAPH_BASE_URL",
            DEFAULT_BASE_URL,
            "LangGraph",
        )?;
        let api_key = resolve_optional(config.langgraph_api_key.as_deref(), "LANGGRAPH_API_KEY");

        Ok(Self { base_url, api_key })
    }
}

/// LangGraph API client.
///
/// Cheap to clone; the underlying `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct LangGraphClient {
    config: LangGraphConfig,
    http: reqwest::Client,
}

impl LangGraphClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: LangGraphConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.config.base_url);
        let mut builder = self
            .http
            .request(method, url)
            .header("content-type", "application/json")
            .header("user-agent", USER_AGENT);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("x-api-key", key);
        }
        builder
    }

    /// Lists assistants registered on the backend.
    pub async fn search_assistants(&self) -> GatewayResult<Vec<Assistant>> {
        let response = self
            .request(reqwest::Method::POST, "/assistants/search")
            .json(&AssistantSearchRequest { limit: None })
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let response = check_status(response).await?;
        response
            .json::<Vec<Assistant>>()
            .await
            .map_err(|err| GatewayError::parse(format!("Failed to parse assistants: {err}")))
    }

    /// Creates a new thread on the backend.
    pub async fn create_thread(&self) -> GatewayResult<Thread> {
        let response = self
            .request(reqwest::Method::POST, "/threads")
            .json(&CreateThreadRequest::default())
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let response = check_status(response).await?;
        response
            .json::<Thread>()
            .await
            .map_err(|err| GatewayError::parse(format!("Failed to parse thread: {err}")))
    }

    /// Fetches an existing thread by id.
    pub async fn get_thread(&self, thread_id: &str) -> GatewayResult<Thread> {
        let response = self
            .request(reqwest::Method::GET, &format!("/threads/{thread_id}"))
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let response = check_status(response).await?;
        response
            .json::<Thread>()
            .await
            .map_err(|err| GatewayError::parse(format!("Failed to parse thread: {err}")))
    }

    /// Fetches the message history of a thread.
    ///
    /// The backend may answer with shapes we do not track; anything without a
    /// `messages` array reads as an empty history.
    pub async fn thread_history(&self, thread_id: &str) -> GatewayResult<Vec<BackendMessage>> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/threads/{thread_id}/history"),
            )
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let response = check_status(response).await?;
        let body = response
            .json::<HistoryResponse>()
            .await
            .map_err(|err| GatewayError::parse(format!("Failed to parse history: {err}")))?;

        Ok(body.messages)
    }

    /// Starts a streaming run and returns the backend's chunk stream.
    pub async fn run_stream(
        &self,
        thread_id: &str,
        assistant_id: &str,
        message: &str,
    ) -> GatewayResult<RunStream> {
        let request = RunStreamRequest {
            assistant_id,
            input: RunInput {
                messages: vec![InputMessage {
                    role: "user",
                    content: message,
                }],
            },
            stream_mode: &["values"],
        };

        debug!(thread_id, assistant_id, "starting run stream");

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/threads/{thread_id}/runs/stream"),
            )
            .header("accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let response = check_status(response).await?;
        Ok(RunStreamParser::new(response.bytes_stream()).boxed())
    }
}

/// Converts a non-2xx response into a structured error.
async fn check_status(response: reqwest::Response) -> GatewayResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::http_status(status.as_u16(), &body))
}

fn classify_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::network(format!("Request timed out: {err}"))
    } else {
        GatewayError::network(format!("Request failed: {err}"))
    }
}
