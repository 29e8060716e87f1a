// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client handle every feature call hangs off.

use std::sync::Arc;

use reqwest::Response;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::message::STREAM_PATH;
use crate::config::ClientConfig;
use crate::dispatch::{CallDescriptor, Dispatcher};
use crate::error::ClientError;
use crate::renew::RenewalCoordinator;
use crate::stream::{consume, CompletionGuard, StreamSummary};
use crate::token::{self, TokenStore};

/// Authenticated client for the document-chat backend.
pub struct ChatClient {
    dispatcher: Dispatcher,
}

impl ChatClient {
    /// Client whose credentials persist at [`ClientConfig::token_path`].
    pub fn new(config: ClientConfig) -> Self {
        let tokens = Arc::new(TokenStore::persistent(config.token_path()));
        Self::with_store(config, tokens)
    }

    /// Client sharing an existing token store.
    pub fn with_store(config: ClientConfig, tokens: Arc<TokenStore>) -> Self {
        let renewal = Arc::new(RenewalCoordinator::new(&config, Arc::clone(&tokens)));
        Self { dispatcher: Dispatcher::new(config, tokens, renewal) }
    }

    pub fn config(&self) -> &ClientConfig {
        self.dispatcher.config()
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        self.dispatcher.tokens()
    }

    pub fn renewal(&self) -> &Arc<RenewalCoordinator> {
        self.dispatcher.renewal()
    }

    /// Send any call through the authenticated pipeline.
    pub async fn send_authenticated(&self, desc: CallDescriptor) -> Result<Response, ClientError> {
        self.dispatcher.send(desc).await
    }

    /// Local check: is the stored access token unexpired (minus skew)?
    ///
    /// Advisory only. Renewal on 401 remains the authority.
    pub fn is_authenticated(&self) -> bool {
        token::is_currently_valid(self.tokens(), self.config().expiry_skew())
    }

    /// Make sure a usable session exists, renewing ahead of time if the
    /// access token has expired locally but a refresh token is stored.
    pub async fn ensure_session(&self) -> Result<(), ClientError> {
        if self.is_authenticated() {
            return Ok(());
        }
        if self.tokens().refresh_token().is_none() {
            return Err(ClientError::AuthExpired { reason: "not logged in".to_owned() });
        }
        debug!("access token expired locally, renewing ahead of use");
        self.renewal().renew().await?;
        Ok(())
    }

    /// Send a chat message and consume the incremental answer.
    ///
    /// `on_increment` receives each text increment in arrival order.
    /// `on_complete` runs exactly once, including when opening the stream
    /// fails and when this future is dropped.
    pub async fn open_chat_stream<F, C>(
        &self,
        conversation_id: &str,
        text: &str,
        on_increment: F,
        on_complete: C,
    ) -> Result<StreamSummary, ClientError>
    where
        F: FnMut(&str),
        C: FnOnce(),
    {
        self.open_chat_stream_until(
            conversation_id,
            text,
            on_increment,
            on_complete,
            CancellationToken::new(),
        )
        .await
    }

    /// [`Self::open_chat_stream`] that stops reading when `cancel` fires.
    pub async fn open_chat_stream_until<F, C>(
        &self,
        conversation_id: &str,
        text: &str,
        on_increment: F,
        on_complete: C,
        cancel: CancellationToken,
    ) -> Result<StreamSummary, ClientError>
    where
        F: FnMut(&str),
        C: FnOnce(),
    {
        let guard = CompletionGuard::new(on_complete);
        let desc = CallDescriptor::post(STREAM_PATH)
            .json(serde_json::json!({ "conversationId": conversation_id, "text": text }))
            .streaming();
        // An open failure drops the guard, which runs on_complete.
        let resp = self.send_authenticated(desc).await?;
        debug!(conversation = conversation_id, status = %resp.status(), "chat stream opened");
        Ok(consume(resp, on_increment, move || guard.complete(), cancel).await)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
