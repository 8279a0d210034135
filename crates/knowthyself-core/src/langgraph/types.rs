//! Wire types for the LangGraph HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::BackendMessage;

/// An assistant registered on the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub assistant_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A conversation thread owned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One chunk of a streaming run, exactly as the backend framed it.
///
/// The relay re-serializes this unmodified, so downstream `values` chunks
/// keep the backend's shape and everything else passes through for clients
/// to recognize or discard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunChunk {
    pub event: String,
    pub data: Value,
}

/// Body for `POST /assistants/search`.
#[derive(Debug, Serialize)]
pub struct AssistantSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Body for `POST /threads`.
#[derive(Debug, Default, Serialize)]
pub struct CreateThreadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// One input message for a run.
#[derive(Debug, Serialize)]
pub struct InputMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Input payload for a run.
#[derive(Debug, Serialize)]
pub struct RunInput<'a> {
    pub messages: Vec<InputMessage<'a>>,
}

/// Body for `POST /threads/{id}/runs/stream`.
#[derive(Debug, Serialize)]
pub struct RunStreamRequest<'a> {
    pub assistant_id: &'a str,
    pub input: RunInput<'a>,
    pub stream_mode: &'a [&'a str],
}

/// Response shape for `GET /threads/{id}/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<BackendMessage>,
}
