// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight credential renewal.
//!
//! At most one call to the refresh endpoint is outstanding at any time.
//! Callers that arrive while one is running await the same shared outcome.
//! The refresh call goes straight to the HTTP client and never through
//! [`crate::dispatch::Dispatcher`], so a 401 from the refresh endpoint cannot
//! recurse into another renewal.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::api::auth::parse_credential_pair;
use crate::config::ClientConfig;
use crate::error::RenewalError;
use crate::token::TokenStore;

/// Path of the renewal endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "/auth/refresh";

type RenewalResult = Result<String, RenewalError>;
type SharedRenewal = Shared<BoxFuture<'static, RenewalResult>>;

enum RenewalState {
    Idle,
    InFlight(SharedRenewal),
}

/// Coordinates renewal of the stored credential pair.
pub struct RenewalCoordinator {
    http: reqwest::Client,
    refresh_url: String,
    tokens: Arc<TokenStore>,
    state: Arc<Mutex<RenewalState>>,
    started: AtomicU64,
}

impl RenewalCoordinator {
    pub fn new(config: &ClientConfig, tokens: Arc<TokenStore>) -> Self {
        crate::dispatch::install_crypto_provider();
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .unwrap_or_default();
        Self {
            http,
            refresh_url: config.endpoint(REFRESH_PATH),
            tokens,
            state: Arc::new(Mutex::new(RenewalState::Idle)),
            started: AtomicU64::new(0),
        }
    }

    /// Obtain a fresh access token, joining a renewal already in progress.
    ///
    /// On success the new pair is already in the store. On failure the store
    /// has been cleared.
    pub async fn renew(&self) -> RenewalResult {
        // Check-then-set with no suspension point in between.
        let renewal = {
            let mut state = self.state.lock();
            match &*state {
                RenewalState::InFlight(shared) => {
                    debug!("joining in-flight renewal");
                    shared.clone()
                }
                RenewalState::Idle => {
                    let shared = self.start().shared();
                    *state = RenewalState::InFlight(shared.clone());
                    shared
                }
            }
        };
        renewal.await
    }

    /// Whether a renewal call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(*self.state.lock(), RenewalState::InFlight(_))
    }

    /// Number of renewal calls started since construction.
    pub fn renewals_started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    fn start(&self) -> BoxFuture<'static, RenewalResult> {
        self.started.fetch_add(1, Ordering::Relaxed);
        let http = self.http.clone();
        let url = self.refresh_url.clone();
        let tokens = Arc::clone(&self.tokens);
        // Weak so the parked future does not keep its own state cell alive.
        let state: Weak<Mutex<RenewalState>> = Arc::downgrade(&self.state);
        async move {
            let result = refresh_once(&http, &url, &tokens).await;
            if let Err(ref e) = result {
                warn!(err = %e, reason = e.as_str(), "credential renewal failed, clearing tokens");
                tokens.clear();
            }
            if let Some(state) = state.upgrade() {
                *state.lock() = RenewalState::Idle;
            }
            result
        }
        .boxed()
    }
}

/// One call to the refresh endpoint.
async fn refresh_once(http: &reqwest::Client, url: &str, tokens: &TokenStore) -> RenewalResult {
    let refresh_token = tokens.refresh_token().ok_or(RenewalError::NoRefreshToken)?;

    let resp = http
        .post(url)
        .json(&serde_json::json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .map_err(|e| RenewalError::Transport(e.to_string()))?;

    let status = resp.status();
    let body = resp.bytes().await.map_err(|e| RenewalError::Transport(format!("read body: {e}")))?;
    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        return Err(RenewalError::ServerRejected(format!("HTTP {status}: {text}")));
    }

    let pair = parse_credential_pair(&body).map_err(RenewalError::Malformed)?;
    let access = pair.access_token.clone();
    tokens.set(pair);
    info!("credentials renewed");
    Ok(access)
}

#[cfg(test)]
#[path = "renew_tests.rs"]
mod tests;
