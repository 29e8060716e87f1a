// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use super::*;
use crate::token::store::{CredentialPair, TokenStore};

const SKEW: Duration = Duration::from_secs(10);

fn token_with(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS512"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.c2lnbmF0dXJl")
}

fn store_with(token: &str) -> TokenStore {
    let store = TokenStore::in_memory();
    store.set(CredentialPair::new(token, "refresh"));
    store
}

#[test]
fn decode_reads_expiry_and_subject() {
    let payload = serde_json::json!({"sub": "alice", "exp": 1_700_000_000, "scope": "USER"});
    let token = token_with(&payload);
    let claims = decode(&token);
    assert!(claims.is_some());
    let claims = claims.expect("claims");
    assert_eq!(claims.expires_at(), Some(1_700_000_000));
    assert_eq!(claims.sub.as_deref(), Some("alice"));
    assert_eq!(claims.extra.get("scope"), Some(&serde_json::json!("USER")));
}

#[test]
fn decode_accepts_padded_payload() {
    let header = URL_SAFE_NO_PAD.encode(b"{}");
    let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp":50}"#);
    assert!(body.ends_with('='), "fixture should be padded: {body}");
    let claims = decode(&format!("{header}.{body}.sig"));
    assert_eq!(claims.and_then(|c| c.expires_at()), Some(50));
}

#[yare::parameterized(
    empty          = { "" },
    one_segment    = { "abc" },
    not_base64     = { "abc.!!!.sig" },
    not_json       = { "abc.bm90IGpzb24.sig" },
    json_not_obj   = { "abc.WzEsMl0.sig" },
)]
fn decode_rejects_malformed(token: &str) {
    assert!(decode(token).is_none());
}

#[test]
fn two_segments_are_enough() {
    let body = URL_SAFE_NO_PAD.encode(br#"{"exp":42}"#);
    assert_eq!(decode(&format!("h.{body}")).and_then(|c| c.expires_at()), Some(42));
}

#[yare::parameterized(
    far_future      = { 3600, true },
    past_skew       = { 15, true },
    exactly_skew    = { 10, false },
    inside_skew     = { 5, false },
    already_expired = { -60, false },
)]
fn validity_respects_skew(offset: i64, expected: bool) {
    let now = epoch_secs();
    let exp = (now as i64 + offset).max(1);
    let store = store_with(&token_with(&serde_json::json!({"exp": exp})));
    assert_eq!(is_currently_valid(&store, SKEW), expected);
}

#[test]
fn is_valid_at_is_deterministic() {
    let claims = decode(&token_with(&serde_json::json!({"exp": 1_000})));
    let claims = claims.expect("claims");
    assert!(claims.is_valid_at(989, SKEW));
    assert!(!claims.is_valid_at(990, SKEW));
    assert!(!claims.is_valid_at(2_000, SKEW));
}

#[test]
fn fractional_expiry_is_floored() {
    let claims = decode(&token_with(&serde_json::json!({"exp": 1_000.9})));
    assert_eq!(claims.and_then(|c| c.expires_at()), Some(1_000));
}

#[test]
fn invalid_without_token_claims_or_expiry() {
    assert!(!is_currently_valid(&TokenStore::in_memory(), SKEW));
    assert!(!is_currently_valid(&store_with("garbage"), SKEW));
    assert!(!is_currently_valid(&store_with(&token_with(&serde_json::json!({"sub": "x"}))), SKEW));
    assert!(!is_currently_valid(&store_with(&token_with(&serde_json::json!({"exp": 0}))), SKEW));
}
