//! Chat session state and the gateway-facing chat client.
//!
//! `ChatSession` is the in-memory conversation view: the thread id, the
//! displayed messages, and the loading flag for the single send that may be
//! in flight. `ChatClient` drives one send against the gateway, feeding the
//! relay's SSE bytes through the incremental frame parser into the session.

use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};
use crate::sse::{FrameBuffer, decode_frame};
use crate::types::{BackendMessage, ChatRequest, ClientMessage, ServerEvent};

/// Message shown when the send request itself fails.
const SEND_FAILED_MESSAGE: &str = "An error occurred while processing your request.";

/// In-memory conversation state for one chat session.
///
/// The message list is always a wholesale projection of the latest backend
/// `values` snapshot; the optimistic user message pushed on send is
/// superseded by the next snapshot, never merged.
#[derive(Debug, Default)]
pub struct ChatSession {
    thread_id: Option<String>,
    messages: Vec<ClientMessage>,
    is_loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend thread id, once the first `thread_id` event arrived.
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Pre-sets the thread id when resuming an existing conversation.
    pub fn with_thread_id(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ClientMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replaces the displayed history with backend messages (thread resume).
    pub fn seed_history(&mut self, history: Vec<BackendMessage>) {
        self.messages = history
            .into_iter()
            .map(BackendMessage::into_client_message)
            .collect();
    }

    /// Starts a send: pushes the optimistic user message and sets the
    /// loading flag.
    ///
    /// # Errors
    /// Fails when a send is already in flight; sends are serialized per
    /// session, a new one requires the previous to complete or fail.
    pub fn begin_send(&mut self, content: &str) -> GatewayResult<()> {
        if self.is_loading {
            return Err(GatewayError::invalid_request(
                "A send is already in flight for this session",
            ));
        }
        self.messages.push(ClientMessage::user(content));
        self.is_loading = true;
        Ok(())
    }

    /// Applies one validated server event to the session.
    pub fn apply_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ThreadId { thread_id } => {
                // First writer wins for the session.
                if self.thread_id.is_none() {
                    debug!(%thread_id, "session bound to thread");
                    self.thread_id = Some(thread_id);
                }
            }
            ServerEvent::Values { messages } => {
                if messages.is_empty() {
                    return;
                }
                self.messages = messages
                    .into_iter()
                    .map(BackendMessage::into_client_message)
                    .collect();
            }
        }
    }

    /// Marks the in-flight send as completed.
    pub fn complete_send(&mut self) {
        self.is_loading = false;
    }

    /// Marks the in-flight send as failed, appending one synthetic assistant
    /// error message. Already-applied snapshots are kept.
    pub fn fail_send(&mut self) {
        self.messages
            .push(ClientMessage::assistant(SEND_FAILED_MESSAGE));
        self.is_loading = false;
    }
}

/// History response from the gateway's `GET /api/history`.
#[derive(Debug, Deserialize)]
struct HistoryBody {
    #[serde(default)]
    messages: Vec<BackendMessage>,
}

/// Client for the gateway's chat API.
#[derive(Debug, Clone)]
pub struct ChatClient {
    gateway_url: String,
    http: reqwest::Client,
}

impl ChatClient {
    /// Creates a client for a gateway at the given base URL.
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Sends one message and folds the streamed response into the session.
    ///
    /// Network-level failure of the request is not propagated: it surfaces as
    /// one synthetic assistant message in the session, per the chat contract.
    /// The loading flag is always cleared when this returns.
    ///
    /// # Errors
    /// Fails only when the session refuses the send (one already in flight).
    pub async fn send(&self, session: &mut ChatSession, message: &str) -> GatewayResult<()> {
        session.begin_send(message)?;

        match self.stream_into(session, message).await {
            Ok(()) => session.complete_send(),
            Err(err) => {
                warn!(%err, "send failed");
                session.fail_send();
            }
        }
        Ok(())
    }

    /// Fetches a thread's history through the gateway.
    pub async fn history(&self, thread_id: &str) -> GatewayResult<Vec<BackendMessage>> {
        let response = self
            .http
            .get(format!("{}/api/history", self.gateway_url))
            .query(&[("threadId", thread_id)])
            .send()
            .await
            .map_err(|err| GatewayError::network(format!("History request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::http_status(status.as_u16(), &body));
        }

        let body: HistoryBody = response
            .json()
            .await
            .map_err(|err| GatewayError::parse(format!("Failed to parse history: {err}")))?;
        Ok(body.messages)
    }

    async fn stream_into(&self, session: &mut ChatSession, message: &str) -> GatewayResult<()> {
        let request = ChatRequest {
            message: message.to_string(),
            thread_id: session.thread_id().map(str::to_string),
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.gateway_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| GatewayError::network(format!("Chat request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::http_status(status.as_u16(), &body));
        }

        let mut stream = response.bytes_stream();
        let mut buffer = FrameBuffer::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|err| GatewayError::network(format!("Stream read failed: {err}")))?;
            buffer.extend(&chunk);
            while let Some(frame) = buffer.next_frame() {
                if let Some(event) = decode_frame(&frame) {
                    session.apply_event(event);
                }
            }
        }
        buffer.finish();

        Ok(())
    }
}
