// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ragchat conversations|title`.

use ragchat::{ChatClient, Conversation};

use super::{report, truncate};

#[derive(Debug, clap::Args)]
pub struct ConversationsArgs {
    #[command(subcommand)]
    pub command: Option<ConversationsCommand>,
}

#[derive(Debug, clap::Subcommand)]
pub enum ConversationsCommand {
    /// List conversations, newest first (default).
    List(ListArgs),
    /// Start an empty conversation.
    New {
        /// Conversation title.
        title: String,
    },
    /// Delete a conversation and its messages.
    Delete {
        /// Conversation ID.
        id: String,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Conversations per page.
    #[arg(long, default_value_t = 10)]
    pub size: u32,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl ConversationsArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(ConversationsCommand::List(list)) = &self.command {
            if list.page == 0 || list.size == 0 {
                anyhow::bail!("--page and --size must be at least 1");
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Args)]
pub struct TitleArgs {
    /// Conversation ID.
    pub conversation: String,
    /// Message to derive the title from.
    #[arg(required = true, trailing_var_arg = true)]
    pub message: Vec<String>,
    /// Derive the title locally instead of asking the backend.
    #[arg(long)]
    pub local: bool,
}

impl TitleArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.message.join(" ").trim().is_empty() {
            anyhow::bail!("message must not be empty");
        }
        Ok(())
    }
}

/// One row of the conversation table.
pub(crate) fn format_row(conv: &Conversation) -> String {
    let created = conv.created_date.as_deref().unwrap_or("-");
    format!("{:<26} {:<40} {created}", conv.id, truncate(&conv.title, 40))
}

pub async fn run(client: &ChatClient, args: &ConversationsArgs) -> i32 {
    match &args.command {
        None => list(client, &ListArgs::default()).await,
        Some(ConversationsCommand::List(list_args)) => list(client, list_args).await,
        Some(ConversationsCommand::New { title }) => match client.create_conversation(title).await {
            Ok(conv) => {
                println!("{}", conv.id);
                0
            }
            Err(e) => report(&e),
        },
        Some(ConversationsCommand::Delete { id }) => match client.delete_conversation(id).await {
            Ok(()) => {
                println!("Deleted conversation {id}.");
                0
            }
            Err(e) => report(&e),
        },
    }
}

async fn list(client: &ChatClient, args: &ListArgs) -> i32 {
    let page = match client.list_conversations(args.page, args.size).await {
        Ok(page) => page,
        Err(e) => return report(&e),
    };
    if page.result.is_empty() {
        println!("No conversations.");
        return 0;
    }
    println!("{:<26} {:<40} CREATED", "ID", "TITLE");
    println!("{}", "-".repeat(80));
    for conv in &page.result {
        println!("{}", format_row(conv));
    }
    println!(
        "page {}/{} ({} total)",
        page.current_page,
        page.total_pages.max(1),
        page.total_elements
    );
    0
}

pub async fn title(client: &ChatClient, args: &TitleArgs) -> i32 {
    let message = args.message.join(" ");
    let title = if args.local {
        ragchat::title_from_text(&message)
    } else {
        client.generate_title(&args.conversation, &message).await
    };
    println!("{title}");
    0
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
