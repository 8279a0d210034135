//! CLI command handlers.

pub mod chat;
pub mod config;
pub mod send;
pub mod serve;
