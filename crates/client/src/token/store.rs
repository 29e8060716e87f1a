// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential pair storage with optional file persistence.
//!
//! The pair is replaced or removed as a unit: readers never see a new
//! access token next to an old refresh token. When a path is configured,
//! every mutation is written through to disk with an atomic rename.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Persisted key for the access token.
pub const ACCESS_KEY: &str = "rag_access_token";
/// Persisted key for the refresh token.
pub const REFRESH_KEY: &str = "rag_refresh_token";

/// Access and refresh token, always stored and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Shared holder of the current credential pair.
pub struct TokenStore {
    pair: RwLock<Option<CredentialPair>>,
    persist_path: Option<PathBuf>,
}

impl TokenStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self { pair: RwLock::new(None), persist_path: None }
    }

    /// Store backed by a JSON file, seeded from it if present.
    ///
    /// A missing, unreadable, or half-populated file loads as logged out.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let pair = load(&path);
        Self { pair: RwLock::new(pair), persist_path: Some(path) }
    }

    pub fn get(&self) -> Option<CredentialPair> {
        self.pair.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.pair.read().as_ref().map(|p| p.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.pair.read().as_ref().map(|p| p.refresh_token.clone())
    }

    /// Replace both tokens.
    pub fn set(&self, pair: CredentialPair) {
        let mut guard = self.pair.write();
        if let Some(ref path) = self.persist_path {
            save(path, Some(&pair));
        }
        *guard = Some(pair);
    }

    /// Remove both tokens.
    pub fn clear(&self) {
        let mut guard = self.pair.write();
        if let Some(ref path) = self.persist_path {
            save(path, None);
        }
        *guard = None;
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn load(path: &Path) -> Option<CredentialPair> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) => {
            debug!(path = %path.display(), "no persisted credentials: {e}");
            return None;
        }
    };
    let mut entries: HashMap<String, String> = match serde_json::from_str(&data) {
        Ok(m) => m,
        Err(e) => {
            warn!(path = %path.display(), "failed to parse persisted credentials: {e}");
            return None;
        }
    };
    let access = entries.remove(ACCESS_KEY).filter(|s| !s.is_empty())?;
    let refresh = entries.remove(REFRESH_KEY).filter(|s| !s.is_empty())?;
    Some(CredentialPair { access_token: access, refresh_token: refresh })
}

/// Write the pair (or an empty object) atomically: unique tmp file, then rename.
fn save(path: &Path, pair: Option<&CredentialPair>) {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let mut entries = HashMap::new();
    if let Some(pair) = pair {
        entries.insert(ACCESS_KEY, pair.access_token.as_str());
        entries.insert(REFRESH_KEY, pair.refresh_token.as_str());
    }
    let json = match serde_json::to_string_pretty(&entries) {
        Ok(j) => j,
        Err(e) => {
            warn!("failed to serialize credentials: {e}");
            return;
        }
    };

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp = path.with_file_name(tmp_name);
    if let Err(e) = std::fs::write(&tmp, json) {
        warn!(path = %tmp.display(), "failed to write credentials: {e}");
        return;
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        warn!(path = %path.display(), "failed to rename credentials file: {e}");
        let _ = std::fs::remove_file(&tmp);
        return;
    }
    debug!(path = %path.display(), cleared = pair.is_none(), "persisted credentials");
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
