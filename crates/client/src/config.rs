// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

/// Connection and credential settings for the chat backend.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Base URL of the backend API; every endpoint path is appended to it.
    #[arg(long, default_value = "http://127.0.0.1:8080/api", env = "RAGCHAT_API_URL")]
    pub api_url: String,

    /// Total timeout for ordinary (non-streaming) calls, in milliseconds.
    #[arg(long, default_value_t = 20000, env = "RAGCHAT_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Connect timeout for all calls, in milliseconds.
    #[arg(long, default_value_t = 10000, env = "RAGCHAT_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: u64,

    /// File holding the persisted credential pair.
    #[arg(long, env = "RAGCHAT_TOKEN_PATH")]
    pub token_path: Option<PathBuf>,

    /// An access token is treated as expired this many seconds early.
    #[arg(long, default_value_t = 10, env = "RAGCHAT_EXPIRY_SKEW_SECS")]
    pub expiry_skew_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080/api".to_owned(),
            timeout_ms: 20000,
            connect_timeout_ms: 10000,
            token_path: None,
            expiry_skew_secs: 10,
        }
    }
}

impl ClientConfig {
    /// Config pointed at `api_url` with every other field defaulted.
    pub fn for_url(api_url: impl Into<String>) -> Self {
        Self { api_url: api_url.into(), ..Self::default() }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn expiry_skew(&self) -> Duration {
        Duration::from_secs(self.expiry_skew_secs)
    }

    /// Resolved credential file: `--token-path` or `<state_dir>/tokens.json`.
    pub fn token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(|| state_dir().join("tokens.json"))
    }

    /// Join an endpoint path onto the base URL. Absolute URLs pass through.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        let base = self.api_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

/// Resolve the state directory for persisted client data.
///
/// Checks `RAGCHAT_STATE_DIR`, then `$XDG_STATE_HOME/ragchat`,
/// then `$HOME/.local/state/ragchat`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RAGCHAT_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("ragchat");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/ragchat");
    }
    PathBuf::from(".ragchat")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
