// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Errors surfaced to callers of the request pipeline.
#[derive(Debug)]
pub enum ClientError {
    /// Credentials could not be renewed; the caller must log in again.
    AuthExpired { reason: String },
    /// Network failure or timeout. Never resolved through renewal.
    Transport { message: String, timed_out: bool },
    /// Non-2xx response that the pipeline did not resolve.
    Status { status: u16, body: String },
    /// 2xx response whose envelope reports a failure code.
    Api { code: i64, message: String },
    /// Response body could not be decoded into the expected shape.
    Decode(String),
    /// Request rejected locally before anything was sent.
    Invalid(String),
}

impl ClientError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthExpired { .. } => "AUTH_EXPIRED",
            Self::Transport { .. } => "TRANSPORT",
            Self::Status { .. } => "HTTP_STATUS",
            Self::Api { .. } => "API",
            Self::Decode(_) => "DECODE",
            Self::Invalid(_) => "INVALID",
        }
    }

    /// Process exit code for the CLI front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthExpired { .. } => 3,
            Self::Invalid(_) => 2,
            _ => 1,
        }
    }

    /// True when the caller should send the user back to the login flow.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::Decode(e.to_string());
        }
        Self::Transport { message: e.to_string(), timed_out: e.is_timeout() }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthExpired { reason } => write!(f, "session expired: {reason}"),
            Self::Transport { message, timed_out: true } => {
                write!(f, "request timed out: {message}")
            }
            Self::Transport { message, .. } => write!(f, "transport error: {message}"),
            Self::Status { status, body } if body.is_empty() => write!(f, "HTTP {status}"),
            Self::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::Api { code, message } => write!(f, "api error {code}: {message}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Invalid(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<RenewalError> for ClientError {
    fn from(e: RenewalError) -> Self {
        Self::AuthExpired { reason: e.to_string() }
    }
}

/// Why a credential renewal failed. Every variant clears the token store.
///
/// `Clone` because one outcome is handed to every caller that joined the
/// same in-flight renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalError {
    NoRefreshToken,
    /// The renewal endpoint answered with a non-success status.
    ServerRejected(String),
    /// The renewal endpoint answered 2xx without a usable credential pair.
    Malformed(String),
    /// The renewal call never got an answer.
    Transport(String),
}

impl RenewalError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRefreshToken => "NO_REFRESH_TOKEN",
            Self::ServerRejected(_) => "SERVER_REJECTED",
            Self::Malformed(_) => "MALFORMED",
            Self::Transport(_) => "TRANSPORT",
        }
    }
}

impl fmt::Display for RenewalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRefreshToken => f.write_str("no refresh token available"),
            Self::ServerRejected(msg) => write!(f, "refresh rejected: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed refresh response: {msg}"),
            Self::Transport(msg) => write!(f, "refresh transport error: {msg}"),
        }
    }
}

impl std::error::Error for RenewalError {}

/// A failure while reading an incremental response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The connection failed mid-body.
    Read(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "stream read failed: {msg}"),
        }
    }
}

impl std::error::Error for StreamError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
