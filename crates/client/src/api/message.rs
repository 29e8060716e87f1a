// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::api::read_data;
use crate::client::ChatClient;
use crate::dispatch::CallDescriptor;
use crate::error::ClientError;

/// Endpoint that answers a chat message with an incremental `data:` stream.
pub const STREAM_PATH: &str = "/message/stream-create";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ChatClient {
    /// Message history of one conversation, oldest first as the server orders it.
    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ClientError> {
        let desc = CallDescriptor::get(format!("/message/list/{conversation_id}"));
        read_data(self.send_authenticated(desc).await?).await
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
