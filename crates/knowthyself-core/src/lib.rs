//! Core KnowThyself library (wire types, SSE framing, backend client, chat session).

pub mod chat;
pub mod config;
pub mod error;
pub mod langgraph;
pub mod sse;
pub mod types;
