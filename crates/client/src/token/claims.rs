// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unverified inspection of compact signed tokens.
//!
//! Only the payload segment is read, to learn the claimed expiry. The
//! signature is never checked; that is the server's job.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use super::store::TokenStore;

/// Claims carried in a token's payload segment.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiry as (possibly fractional) seconds since the Unix epoch.
    #[serde(default)]
    exp: Option<f64>,
    /// Subject, usually the username.
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Claimed expiry in whole epoch seconds. Absent, zero, or negative
    /// values count as no expiry claim.
    pub fn expires_at(&self) -> Option<u64> {
        match self.exp {
            Some(exp) if exp.is_finite() && exp > 0.0 => Some(exp.floor() as u64),
            _ => None,
        }
    }

    /// True if the token is claimed valid for more than `skew` past `now_secs`.
    pub fn is_valid_at(&self, now_secs: u64, skew: Duration) -> bool {
        match self.expires_at() {
            Some(exp) => exp > now_secs.saturating_add(skew.as_secs()),
            None => false,
        }
    }
}

/// Decode the payload of a dot-delimited token.
///
/// Returns `None` for fewer than two segments, a segment that is not
/// base64url, or a payload that is not a JSON object.
pub fn decode(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether the stored access token is claimed valid beyond `skew`.
pub fn is_currently_valid(store: &TokenStore, skew: Duration) -> bool {
    let Some(token) = store.access_token() else {
        return false;
    };
    let Some(claims) = decode(&token) else {
        return false;
    };
    claims.is_valid_at(epoch_secs(), skew)
}

/// Current wall-clock time in whole epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod tests;
