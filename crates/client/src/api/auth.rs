// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Login, registration, and logout against the public auth endpoints.

use serde::Deserialize;
use tracing::{info, warn};

use crate::api::{parse_envelope, read_ack};
use crate::client::ChatClient;
use crate::dispatch::CallDescriptor;
use crate::error::ClientError;
use crate::token::CredentialPair;

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const REGISTER_PATH: &str = "/user/register";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenPayload {
    fn into_pair(self) -> Option<CredentialPair> {
        let access = self.access_token.filter(|s| !s.is_empty())?;
        let refresh = self.refresh_token.filter(|s| !s.is_empty())?;
        Some(CredentialPair { access_token: access, refresh_token: refresh })
    }
}

/// Extract a credential pair from a login or refresh response body.
///
/// Reads `data.accessToken`/`data.refreshToken`, falling back to top-level
/// fields. Both tokens must be present and non-empty.
pub(crate) fn parse_credential_pair(body: &[u8]) -> Result<CredentialPair, String> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| format!("not JSON: {e}"))?;
    let enveloped = value
        .get("data")
        .cloned()
        .and_then(|d| serde_json::from_value::<TokenPayload>(d).ok())
        .and_then(TokenPayload::into_pair);
    if let Some(pair) = enveloped {
        return Ok(pair);
    }
    serde_json::from_value::<TokenPayload>(value)
        .ok()
        .and_then(TokenPayload::into_pair)
        .ok_or_else(|| "response lacks accessToken/refreshToken".to_owned())
}

impl ChatClient {
    /// Authenticate and store the returned credential pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let desc = CallDescriptor::post(LOGIN_PATH)
            .json(serde_json::json!({ "username": username, "password": password }))
            .skip_auth();
        let resp = self.send_authenticated(desc).await?;
        let body = resp.bytes().await.map_err(ClientError::from_reqwest)?;
        // Surface an envelope failure code before looking for tokens.
        parse_envelope::<serde_json::Value>(&body)?;
        let pair = parse_credential_pair(&body).map_err(ClientError::Decode)?;
        self.tokens().set(pair);
        info!(username, "logged in");
        Ok(())
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let desc = CallDescriptor::post(REGISTER_PATH)
            .json(serde_json::json!({ "username": username, "password": password }))
            .skip_auth();
        let resp = self.send_authenticated(desc).await?;
        read_ack(resp).await
    }

    /// Invalidate the session server-side, best-effort, and always clear
    /// local credentials.
    pub async fn logout(&self) {
        let pair = self.tokens().get();
        let body = serde_json::json!({
            "accessToken": pair.as_ref().map(|p| p.access_token.as_str()),
            "refreshToken": pair.as_ref().map(|p| p.refresh_token.as_str()),
        });
        let desc = CallDescriptor::post(LOGOUT_PATH).json(body).skip_auth();
        match self.send_authenticated(desc).await {
            Ok(_) => info!("logged out"),
            Err(e) => warn!(err = %e, "server logout failed, clearing local credentials anyway"),
        }
        self.tokens().clear();
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
