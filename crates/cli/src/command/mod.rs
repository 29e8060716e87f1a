// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands. Each returns a process exit code.

pub mod auth;
pub mod chat;
pub mod conversation;
pub mod document;
pub mod profile;

use ragchat::{ChatClient, ClientError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Log in and store the credential pair.
    Login(auth::CredentialsArgs),
    /// Create an account.
    Register(auth::CredentialsArgs),
    /// End the session and forget stored credentials.
    Logout,
    /// Show the signed-in user's profile.
    Whoami,
    /// Show local session state without contacting the backend.
    Status,
    /// Ask a question and print the answer as it streams in.
    Chat(chat::ChatArgs),
    /// Print a conversation's message history.
    Messages(chat::MessagesArgs),
    /// Manage conversations.
    Conversations(conversation::ConversationsArgs),
    /// Generate a title for a conversation from a message.
    Title(conversation::TitleArgs),
    /// Upload a PDF for indexing.
    Upload(document::UploadArgs),
    /// Manage uploaded documents.
    Documents(document::DocumentsArgs),
    /// Show or update the signed-in user's profile.
    Profile(profile::ProfileArgs),
}

impl Command {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Chat(args) => args.validate(),
            Self::Title(args) => args.validate(),
            Self::Conversations(args) => args.validate(),
            _ => Ok(()),
        }
    }
}

/// Run one subcommand. `cancel` fires on Ctrl-C.
pub async fn run(command: &Command, client: &ChatClient, cancel: CancellationToken) -> i32 {
    match command {
        Command::Login(args) => auth::login(client, args).await,
        Command::Register(args) => auth::register(client, args).await,
        Command::Logout => auth::logout(client).await,
        Command::Whoami => auth::whoami(client).await,
        Command::Status => auth::status(client),
        Command::Chat(args) => chat::chat(client, args, cancel).await,
        Command::Messages(args) => chat::messages(client, args).await,
        Command::Conversations(args) => conversation::run(client, args).await,
        Command::Title(args) => conversation::title(client, args).await,
        Command::Upload(args) => document::upload(client, args).await,
        Command::Documents(args) => document::run(client, args).await,
        Command::Profile(args) => profile::run(client, args).await,
    }
}

/// Print a client error and map it to an exit code.
pub(crate) fn report(e: &ClientError) -> i32 {
    eprintln!("error: {e}");
    if e.is_auth_expired() {
        eprintln!("hint: run `ragchat login` to sign in again");
    }
    e.exit_code()
}

/// Shorten `text` to `max` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
