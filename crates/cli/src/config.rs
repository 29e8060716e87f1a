// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use ragchat::ClientConfig;

use crate::command::Command;

/// Command-line client for the document-chat backend.
#[derive(Debug, Parser)]
#[command(name = "ragchat", version, about)]
pub struct Config {
    #[command(flatten)]
    pub client: ClientConfig,

    /// Log format (json or text).
    #[arg(long, env = "RAGCHAT_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "RAGCHAT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    /// Validate settings clap cannot check on its own.
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = &self.client.api_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!("--api-url must be an http(s) URL, got {url:?}");
        }
        if self.client.timeout_ms == 0 {
            anyhow::bail!("--timeout-ms must be positive");
        }
        if self.client.connect_timeout_ms == 0 {
            anyhow::bail!("--connect-timeout-ms must be positive");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
        self.command.validate()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
