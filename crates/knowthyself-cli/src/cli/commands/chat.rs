//! Interactive chat command.

use anyhow::{Context, Result};
use knowthyself_core::chat::{ChatClient, ChatSession};
use knowthyself_core::config::Config;
use knowthyself_core::types::{ClientMessage, Sender};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub async fn run(thread: Option<&str>, config: &Config) -> Result<()> {
    let client = ChatClient::new(config.resolved_gateway_url());

    let mut session = if let Some(id) = thread {
        let mut session = ChatSession::with_thread_id(id);
        let history = client.history(id).await.context("fetch thread history")?;
        session.seed_history(history);
        session
    } else {
        ChatSession::new()
    };

    for message in session.messages() {
        print_message(message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        client.send(&mut session, input).await.context("send message")?;

        match last_assistant(&session) {
            Some(message) => print_message(message),
            None => println!("(no reply)"),
        }
    }

    Ok(())
}

pub(crate) fn last_assistant(session: &ChatSession) -> Option<&ClientMessage> {
    session
        .messages()
        .iter()
        .rev()
        .find(|message| message.sender == Sender::Assistant)
}

fn print_message(message: &ClientMessage) {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Assistant => "assistant",
    };
    println!("{who}: {}", message.content);

    if let Some(attachments) = &message.attachments {
        if let Some(tokens) = &attachments.tokens {
            println!("  [{} tokens attached]", tokens.len());
        }
        if attachments.attention_matrix.is_some() {
            println!("  [attention matrix attached]");
        }
        if attachments.auxiliary_view_ref.is_some() {
            println!("  [visualization attached]");
        }
    }
}
