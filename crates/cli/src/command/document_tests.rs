// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    bytes     = { 512, "512 B" },
    kilobytes = { 2048, "2.0 KB" },
    megabytes = { 5 * 1024 * 1024 + 512 * 1024, "5.5 MB" },
    limit     = { 50 * 1024 * 1024, "50.0 MB" },
)]
fn human_sizes(bytes: u64, expected: &str) {
    assert_eq!(human_size(bytes), expected);
}

#[test]
fn row_handles_missing_fields() -> anyhow::Result<()> {
    let doc: DocumentInfo = serde_json::from_str(r#"{"id":"d1","filename":"a.pdf"}"#)?;
    let row = format_row(&doc);
    assert!(row.starts_with("d1 "));
    assert!(row.ends_with(" -"));
    Ok(())
}
