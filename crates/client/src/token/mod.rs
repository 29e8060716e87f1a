// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential state: the stored pair and what its access token claims.

pub mod claims;
pub mod store;

pub use claims::{decode, is_currently_valid, Claims};
pub use store::{CredentialPair, TokenStore};
