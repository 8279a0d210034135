//! LangGraph backend client (assistants, threads, streaming runs).

pub mod client;
mod sse;
pub(crate) mod types;

pub use client::{DEFAULT_BASE_URL, LangGraphClient, LangGraphConfig, RunStream};
pub use types::{Assistant, RunChunk, Thread};
