// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{read_ack, read_data};
use crate::client::ChatClient;
use crate::dispatch::CallDescriptor;
use crate::error::ClientError;

pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const PDF_MIME: &str = "application/pdf";
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub chunk_count: Option<u32>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Check name and size of a candidate upload. Returns the file name to send.
pub fn validate_upload(path: &Path, size: u64) -> Result<String, ClientError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ClientError::Invalid("only PDF files are allowed".to_owned()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ClientError::Invalid(format!(
            "file is {size} bytes, limit is {MAX_UPLOAD_BYTES} (50MB)"
        )));
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| ClientError::Invalid(format!("bad file name: {}", path.display())))
}

impl ChatClient {
    /// Upload a PDF for indexing. Validation happens before any network call.
    pub async fn upload_document(&self, path: &Path) -> Result<DocumentInfo, ClientError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ClientError::Invalid(format!("{}: {e}", path.display())))?;
        let file_name = validate_upload(path, meta.len())?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Invalid(format!("{}: {e}", path.display())))?;
        // Re-check: the file may have grown between stat and read.
        validate_upload(path, bytes.len() as u64)?;

        let desc = CallDescriptor::post("/documents/upload").file(
            UPLOAD_FIELD,
            file_name.clone(),
            PDF_MIME,
            bytes,
        );
        let doc: DocumentInfo = read_data(self.send_authenticated(desc).await?).await?;
        info!(file = %file_name, id = %doc.id, "document uploaded");
        Ok(doc)
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentInfo>, ClientError> {
        let resp = self.send_authenticated(CallDescriptor::get("/documents/my-documents")).await?;
        read_data(resp).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), ClientError> {
        let desc = CallDescriptor::delete(format!("/documents/{id}"));
        read_ack(self.send_authenticated(desc).await?).await
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
