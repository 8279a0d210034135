//! One-shot send command.

use anyhow::{Context, Result};
use knowthyself_core::chat::{ChatClient, ChatSession};
use knowthyself_core::config::Config;

use super::chat::last_assistant;

pub async fn run(
    message: &str,
    thread: Option<&str>,
    show_thread: bool,
    config: &Config,
) -> Result<()> {
    let client = ChatClient::new(config.resolved_gateway_url());
    let mut session = match thread {
        Some(id) => ChatSession::with_thread_id(id),
        None => ChatSession::new(),
    };

    client.send(&mut session, message).await.context("send message")?;

    match last_assistant(&session) {
        Some(reply) => println!("{}", reply.content),
        None => println!("(no reply)"),
    }

    if show_thread && let Some(id) = session.thread_id() {
        println!("thread: {id}");
    }

    Ok(())
}
