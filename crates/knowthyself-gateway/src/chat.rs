use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{StreamExt, future, stream};
use knowthyself_core::error::GatewayError;
use knowthyself_core::types::{ChatRequest, ServerEvent};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{ApiError, AppState};

/// Wraps a JSON payload in a single SSE data frame.
fn sse_frame(json: &str) -> Bytes {
    Bytes::from(format!("data: {json}\n\n"))
}

/// Relays a chat message to the backend as a streaming run.
///
/// Resolves an assistant and a thread, then responds with an SSE body:
/// a synthetic `thread_id` frame first, followed by every backend chunk
/// re-emitted as a `data:` frame. An upstream failure mid-stream ends
/// the body with an error, which drops the connection.
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    if request.message.trim().is_empty() {
        return Err(GatewayError::invalid_request("message is required").into());
    }

    let assistants = state.backend.search_assistants().await?;
    let Some(assistant) = assistants.into_iter().next() else {
        return Err(GatewayError::no_assistant().into());
    };

    let thread = match request.thread_id.as_deref() {
        Some(id) => state.backend.get_thread(id).await,
        None => state.backend.create_thread().await,
    }
    .map_err(|err| {
        GatewayError::thread_resolution(format!("Failed to resolve thread: {}", err.message))
    })?;

    let upstream = state
        .backend
        .run_stream(&thread.thread_id, &assistant.assistant_id, &request.message)
        .await?;

    debug!(
        backend = state.backend.base_url(),
        thread_id = %thread.thread_id,
        assistant_id = %assistant.assistant_id,
        "relaying run stream"
    );

    let announce = ServerEvent::ThreadId {
        thread_id: thread.thread_id.clone(),
    };
    let announce = serde_json::to_string(&announce)
        .map_err(|err| GatewayError::parse(format!("Failed to encode thread_id frame: {err}")))?;

    let frames = stream::once(future::ready(Ok(sse_frame(&announce)))).chain(upstream.map(
        |chunk| -> Result<Bytes, GatewayError> {
            let chunk = chunk?;
            let json = serde_json::to_string(&chunk)
                .map_err(|err| GatewayError::parse(format!("Failed to encode chunk: {err}")))?;
            Ok(sse_frame(&json))
        },
    ));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Ok((headers, Body::from_stream(frames)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(rename = "threadId")]
    thread_id: Option<String>,
}

/// Returns the backend message history for a thread as `{"messages": [...]}`.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(thread_id) = params.thread_id.filter(|id| !id.trim().is_empty()) else {
        return Err(GatewayError::invalid_request("threadId is required").into());
    };

    let messages = state.backend.thread_history(&thread_id).await?;
    Ok(Json(json!({ "messages": messages })))
}
