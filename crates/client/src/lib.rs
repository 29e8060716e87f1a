// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated request pipeline for the document-chat backend.
//!
//! Every call goes through one [`dispatch::Dispatcher`]: it attaches the
//! stored bearer token, renews credentials once on a 401 (single-flight, see
//! [`renew`]), and retries. Chat answers arrive as `data:`-prefixed lines and
//! are decoded incrementally by [`stream`].

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod renew;
pub mod stream;
pub mod token;

pub use api::conversation::{title_from_text, Conversation};
pub use api::document::DocumentInfo;
pub use api::message::{Message, Role};
pub use api::user::UserProfile;
pub use api::Page;
pub use client::ChatClient;
pub use config::ClientConfig;
pub use dispatch::{CallDescriptor, Dispatcher};
pub use error::{ClientError, RenewalError, StreamError};
pub use stream::StreamSummary;
pub use token::{CredentialPair, TokenStore};

#[cfg(test)]
pub(crate) mod test_support;
