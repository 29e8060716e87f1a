// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch: bearer attachment, public-endpoint detection, and the
//! one-shot renew-and-retry on 401.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Method, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::renew::RenewalCoordinator;
use crate::token::TokenStore;

/// Endpoints that never carry credentials and never trigger renewal.
pub const PUBLIC_ENDPOINTS: &[&str] =
    &["/user/register", "/auth/login", "/auth/refresh", "/auth/logout"];

/// Whether `path` (relative or absolute URL) targets a public endpoint.
pub fn is_public_path(path: &str) -> bool {
    let mut path = path;
    let parsed;
    if path.starts_with("http") {
        if let Ok(url) = reqwest::Url::parse(path) {
            parsed = url;
            path = parsed.path();
        }
    }
    let path = path.split(['?', '#']).next().unwrap_or(path);
    PUBLIC_ENDPOINTS.iter().any(|ep| path == *ep || path.ends_with(ep))
}

/// Request payload. Kept in a rebuildable form so a retry can resend it.
#[derive(Debug, Clone)]
pub enum CallBody {
    Json(serde_json::Value),
    File { field: String, file_name: String, mime: String, bytes: Bytes },
}

/// One logical outbound call.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    pub path: String,
    pub method: Method,
    pub body: Option<CallBody>,
    pub query: Vec<(String, String)>,
    skip_auth: bool,
    streaming: bool,
    retried: bool,
}

impl CallDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            query: Vec::new(),
            skip_auth: false,
            streaming: false,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(CallBody::Json(body));
        self
    }

    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.body = Some(CallBody::File {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        });
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Treat this call as public regardless of its path.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Send without the bounded total timeout; used for incremental bodies.
    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn is_public(&self) -> bool {
        self.skip_auth || is_public_path(&self.path)
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Whether the renew-and-retry has already been spent on this call.
    pub fn retried(&self) -> bool {
        self.retried
    }
}

/// Sends calls with the current credentials and recovers once from a 401.
pub struct Dispatcher {
    config: ClientConfig,
    http: reqwest::Client,
    stream_http: reqwest::Client,
    tokens: Arc<TokenStore>,
    renewal: Arc<RenewalCoordinator>,
}

impl Dispatcher {
    pub fn new(
        config: ClientConfig,
        tokens: Arc<TokenStore>,
        renewal: Arc<RenewalCoordinator>,
    ) -> Self {
        install_crypto_provider();
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_default();
        let stream_http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_default();
        Self { config, http, stream_http, tokens, renewal }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn renewal(&self) -> &Arc<RenewalCoordinator> {
        &self.renewal
    }

    /// Send a call and return its successful response.
    ///
    /// A 401 on a non-public call renews the credentials and resends the call
    /// exactly once. If renewal fails the store is cleared and the call fails
    /// with [`ClientError::AuthExpired`]. Any other non-2xx status is returned
    /// as [`ClientError::Status`].
    pub async fn send(&self, mut desc: CallDescriptor) -> Result<Response, ClientError> {
        let public = desc.is_public();
        let token = if public { None } else { self.tokens.access_token() };

        let resp = self.dispatch(&desc, token.as_deref()).await?;
        if resp.status() != StatusCode::UNAUTHORIZED || public || desc.retried {
            return check_status(resp).await;
        }

        desc.retried = true;
        debug!(path = %desc.path, "401 received, renewing credentials");
        match self.renewal.renew().await {
            Ok(new_token) => {
                info!(path = %desc.path, "retrying with renewed credentials");
                let resp = self.dispatch(&desc, Some(&new_token)).await?;
                check_status(resp).await
            }
            Err(e) => {
                warn!(path = %desc.path, err = %e, "renewal failed, session expired");
                Err(e.into())
            }
        }
    }

    async fn dispatch(
        &self,
        desc: &CallDescriptor,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let client = if desc.streaming { &self.stream_http } else { &self.http };
        let mut req = client.request(desc.method.clone(), self.config.endpoint(&desc.path));
        if !desc.query.is_empty() {
            req = req.query(&desc.query);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        match &desc.body {
            Some(CallBody::Json(value)) => req = req.json(value),
            Some(CallBody::File { field, file_name, mime, bytes }) => {
                let part = reqwest::multipart::Part::bytes(bytes.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(|e| ClientError::Invalid(format!("bad mime type {mime}: {e}")))?;
                let form = reqwest::multipart::Form::new().part(field.clone(), part);
                req = req.multipart(form);
            }
            None => {}
        }
        debug!(method = %desc.method, path = %desc.path, auth = token.is_some(), "dispatch");
        req.send().await.map_err(ClientError::from_reqwest)
    }
}

/// Pass 2xx responses through; turn anything else into [`ClientError::Status`].
async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { status: status.as_u16(), body })
}

/// reqwest is built without a default TLS provider; pick ring once per process.
pub(crate) fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
