//! Message and wire-event types shared by the relay and the chat client.
//!
//! Two layers live here: the wire shapes emitted by the LangGraph backend
//! (`BackendMessage`, `ServerEvent`) and the client-facing message model the
//! chat session displays (`ClientMessage`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message, from the client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Model-introspection artifacts attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachments {
    /// Token strings for the token-list view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<String>>,
    /// Attention weights (one row per token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention_matrix: Option<Vec<Vec<f64>>>,
    /// Reference to an embedded HTML visualization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary_view_ref: Option<String>,
}

impl Attachments {
    fn is_empty(&self) -> bool {
        self.tokens.is_none() && self.attention_matrix.is_none() && self.auxiliary_view_ref.is_none()
    }
}

/// A message as displayed in the chat session.
///
/// Identity is the `id`; uniqueness is not enforced because `values` events
/// replace the whole list rather than merging. Lives only in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Attachments>,
}

impl ClientMessage {
    /// Creates a user message with a fresh id, timestamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            attachments: None,
        }
    }

    /// Creates an assistant message with a fresh id, timestamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            attachments: None,
        }
    }
}

/// Backend message id — LangGraph emits both strings and numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Str(String),
    Num(i64),
}

impl MessageId {
    fn into_string(self) -> String {
        match self {
            MessageId::Str(s) => s,
            MessageId::Num(n) => n.to_string(),
        }
    }
}

/// One part of a structured message content list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Message content — either plain text or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Introspection payloads the backend rides along in `additional_kwargs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalKwargs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bert_viz_view: Option<String>,
}

/// A message as the LangGraph backend reports it in `values` snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(rename = "type")]
    pub message_type: String,
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_kwargs: Option<AdditionalKwargs>,
}

/// Extracts display text from backend message content.
///
/// Plain text passes through; for part lists the first part carrying
/// non-empty `text` wins, otherwise the empty string.
pub fn extract_text(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().filter(|t| !t.is_empty()))
            .unwrap_or_default()
            .to_string(),
    }
}

impl BackendMessage {
    /// Maps a backend wire message into the client display model.
    ///
    /// `ai`/`assistant` types map to the assistant sender, everything else
    /// (`human`, `user`, `system`) to the user. Missing ids get a fresh UUID;
    /// unparsable timestamps fall back to now.
    pub fn into_client_message(self) -> ClientMessage {
        let sender = match self.message_type.as_str() {
            "ai" | "assistant" => Sender::Assistant,
            _ => Sender::User,
        };

        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

        let attachments = self.additional_kwargs.and_then(|kwargs| {
            let attachments = Attachments {
                tokens: kwargs.token,
                attention_matrix: kwargs.attention,
                auxiliary_view_ref: kwargs.bert_viz_view,
            };
            if attachments.is_empty() {
                None
            } else {
                Some(attachments)
            }
        });

        ClientMessage {
            id: self
                .id
                .map_or_else(|| Uuid::new_v4().to_string(), MessageId::into_string),
            content: extract_text(&self.content),
            sender,
            timestamp,
            attachments,
        }
    }
}

/// Request body for the gateway's `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(
        rename = "threadId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub thread_id: Option<String>,
}

/// Events the relay emits downstream, discriminated on the `event` tag with
/// the payload under `data`.
///
/// Exhaustive matching on this enum is the single place new event kinds must
/// be wired through; anything that fails to deserialize is not a server event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "thread_id")]
    ThreadId { thread_id: String },
    #[serde(rename = "values")]
    Values { messages: Vec<BackendMessage> },
}
