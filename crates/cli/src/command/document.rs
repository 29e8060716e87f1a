// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ragchat upload|documents`.

use std::path::PathBuf;

use ragchat::{ChatClient, DocumentInfo};

use super::{report, truncate};

#[derive(Debug, clap::Args)]
pub struct UploadArgs {
    /// PDF file to upload (50MB max).
    pub path: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct DocumentsArgs {
    #[command(subcommand)]
    pub command: Option<DocumentsCommand>,
}

#[derive(Debug, clap::Subcommand)]
pub enum DocumentsCommand {
    /// List uploaded documents (default).
    List,
    /// Delete an uploaded document.
    Delete {
        /// Document ID.
        id: String,
    },
}

/// Human-readable byte count.
pub(crate) fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

pub(crate) fn format_row(doc: &DocumentInfo) -> String {
    let size = doc.file_size.map(human_size).unwrap_or_else(|| "-".to_owned());
    let status = doc.status.as_deref().unwrap_or("-");
    format!("{:<26} {:<32} {size:>10} {status}", doc.id, truncate(&doc.filename, 32))
}

pub async fn upload(client: &ChatClient, args: &UploadArgs) -> i32 {
    match client.upload_document(&args.path).await {
        Ok(doc) => {
            println!("Uploaded {} as {}.", args.path.display(), doc.id);
            0
        }
        Err(e) => report(&e),
    }
}

pub async fn run(client: &ChatClient, args: &DocumentsArgs) -> i32 {
    match &args.command {
        None | Some(DocumentsCommand::List) => match client.list_documents().await {
            Ok(docs) if docs.is_empty() => {
                println!("No documents.");
                0
            }
            Ok(docs) => {
                println!("{:<26} {:<32} {:>10} STATUS", "ID", "FILENAME", "SIZE");
                println!("{}", "-".repeat(80));
                for doc in &docs {
                    println!("{}", format_row(doc));
                }
                0
            }
            Err(e) => report(&e),
        },
        Some(DocumentsCommand::Delete { id }) => match client.delete_document(id).await {
            Ok(()) => {
                println!("Deleted document {id}.");
                0
            }
            Err(e) => report(&e),
        },
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
