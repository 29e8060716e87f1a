// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ragchat chat|messages`.

use std::io::Write;

use ragchat::{title_from_text, ChatClient, Message};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::report;

/// Exit code when the user interrupts a streaming answer.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, clap::Args)]
pub struct ChatArgs {
    /// Conversation to continue. A new one is created when omitted.
    #[arg(long, short)]
    pub conversation: Option<String>,
    /// Question text. Multiple words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true)]
    pub message: Vec<String>,
}

impl ChatArgs {
    pub fn text(&self) -> String {
        self.message.join(" ")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.text().trim().is_empty() {
            anyhow::bail!("message must not be empty");
        }
        Ok(())
    }
}

#[derive(Debug, clap::Args)]
pub struct MessagesArgs {
    /// Conversation ID.
    pub conversation: String,
}

pub async fn chat(client: &ChatClient, args: &ChatArgs, cancel: CancellationToken) -> i32 {
    let text = args.text();
    let (conversation_id, is_new) = match &args.conversation {
        Some(id) => (id.clone(), false),
        None => match client.create_conversation(&title_from_text(&text)).await {
            Ok(conv) => {
                eprintln!("conversation: {}", conv.id);
                (conv.id, true)
            }
            Err(e) => return report(&e),
        },
    };

    let mut stdout = std::io::stdout();
    let result = client
        .open_chat_stream_until(
            &conversation_id,
            &text,
            |increment| {
                let _ = stdout.write_all(increment.as_bytes());
                let _ = stdout.flush();
            },
            || println!(),
            cancel,
        )
        .await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => return report(&e),
    };
    debug!(increments = summary.increments, bytes = summary.bytes, "answer complete");
    if let Some(e) = &summary.error {
        eprintln!("error: {e}");
        return 1;
    }
    if summary.cancelled {
        eprintln!("interrupted");
        return EXIT_INTERRUPTED;
    }

    if is_new {
        let title = client.generate_title(&conversation_id, &text).await;
        eprintln!("title: {title}");
    }
    0
}

/// One history line: `role: text`.
pub(crate) fn format_message(message: &Message) -> String {
    format!("{}: {}", message.role, message.text)
}

pub async fn messages(client: &ChatClient, args: &MessagesArgs) -> i32 {
    match client.list_messages(&args.conversation).await {
        Ok(messages) => {
            if messages.is_empty() {
                println!("No messages.");
            }
            for message in &messages {
                println!("{}", format_message(message));
            }
            0
        }
        Err(e) => report(&e),
    }
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
