// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use crate::api::read_data;
use crate::client::ChatClient;
use crate::dispatch::CallDescriptor;
use crate::error::ClientError;

/// Profile of the signed-in user. Every field is optional so a partial
/// update serializes only what was set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
}

impl UserProfile {
    /// Name to show in a prompt or header.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.username.clone().unwrap_or_default(),
        }
    }
}

impl ChatClient {
    pub async fn my_info(&self) -> Result<UserProfile, ClientError> {
        read_data(self.send_authenticated(CallDescriptor::get("/user/my-info")).await?).await
    }

    /// Apply a partial profile update and return the stored profile.
    pub async fn update_my_info(&self, update: &UserProfile) -> Result<UserProfile, ClientError> {
        let body =
            serde_json::to_value(update).map_err(|e| ClientError::Invalid(e.to_string()))?;
        let desc = CallDescriptor::put("/user/update-my-info").json(body);
        read_data(self.send_authenticated(desc).await?).await
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
