// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed calls to the chat backend, all routed through the dispatcher.
//!
//! Responses use the backend's `{code, message, data}` envelope.

pub mod auth;
pub mod conversation;
pub mod document;
pub mod message;
pub mod user;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Envelope codes the backend uses for success.
const SUCCESS_CODES: &[i64] = &[0, 1000];

/// Backend response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code.map_or(true, |c| SUCCESS_CODES.contains(&c))
    }

    fn into_result(self) -> Result<Option<T>, ClientError> {
        if !self.is_success() {
            return Err(ClientError::Api {
                code: self.code.unwrap_or_default(),
                message: self.message.unwrap_or_default(),
            });
        }
        Ok(self.data)
    }
}

/// Paged list as returned by the backend's list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

/// Decode the envelope and return its `data`, which must be present.
pub(crate) async fn read_data<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let path = resp.url().path().to_owned();
    read_optional(resp)
        .await?
        .ok_or_else(|| ClientError::Decode(format!("{path}: response has no data")))
}

/// Decode the envelope and return its `data`, if any.
pub(crate) async fn read_optional<T: DeserializeOwned>(
    resp: Response,
) -> Result<Option<T>, ClientError> {
    let bytes = resp.bytes().await.map_err(ClientError::from_reqwest)?;
    parse_envelope(&bytes)
}

/// Decode the envelope, ignoring `data`. An empty body is an acknowledgement.
pub(crate) async fn read_ack(resp: Response) -> Result<(), ClientError> {
    let bytes = resp.bytes().await.map_err(ClientError::from_reqwest)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    parse_envelope::<serde_json::Value>(&bytes).map(|_| ())
}

pub(crate) fn parse_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<Option<T>, ClientError> {
    let envelope: ApiResponse<T> =
        serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
    envelope.into_result()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
