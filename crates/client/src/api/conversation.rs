// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{read_ack, read_data, Page};
use crate::client::ChatClient;
use crate::dispatch::CallDescriptor;
use crate::error::ClientError;

/// Title used when the backend cannot generate one.
pub const FALLBACK_TITLE: &str = "Untitled Analysis";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// ISO-8601 instant as sent by the server.
    #[serde(default)]
    pub created_date: Option<String>,
}

/// Local title: the first four words, with `...` when text was cut.
pub fn title_from_text(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    let title = words.iter().take(4).copied().collect::<Vec<_>>().join(" ");
    if words.len() > 4 {
        format!("{title}...")
    } else {
        title
    }
}

impl ChatClient {
    pub async fn create_conversation(&self, title: &str) -> Result<Conversation, ClientError> {
        let body = serde_json::json!({ "title": title });
        let desc = CallDescriptor::post("/conversation/create").json(body);
        read_data(self.send_authenticated(desc).await?).await
    }

    pub async fn list_conversations(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<Conversation>, ClientError> {
        let desc =
            CallDescriptor::get("/conversation/list").query("page", page).query("size", size);
        read_data(self.send_authenticated(desc).await?).await
    }

    pub async fn delete_conversation(&self, id: &str) -> Result<(), ClientError> {
        let desc = CallDescriptor::delete(format!("/conversation/delete/{id}"));
        read_ack(self.send_authenticated(desc).await?).await
    }

    /// Ask the backend to title a conversation from its first message.
    ///
    /// Never fails: any error is logged and [`FALLBACK_TITLE`] returned.
    pub async fn generate_title(&self, conversation_id: &str, user_message: &str) -> String {
        let desc = CallDescriptor::post("/api/chat/generate-title").json(serde_json::json!({
            "conversationId": conversation_id,
            "userMessage": user_message,
        }));
        let result = match self.send_authenticated(desc).await {
            Ok(resp) => read_data::<String>(resp).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(title) => title,
            Err(e) => {
                warn!(conversation = conversation_id, err = %e, "title generation failed");
                FALLBACK_TITLE.to_owned()
            }
        }
    }
}

#[cfg(test)]
#[path = "conversation_tests.rs"]
mod tests;
