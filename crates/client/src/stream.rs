// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental consumption of line-framed chat output.
//!
//! The body arrives in arbitrary chunks. Bytes are decoded with a decoder
//! that holds back an incomplete trailing UTF-8 sequence, decoded text is
//! split on `\n`, and the unterminated tail is carried into the next chunk.
//! Every complete `data:` line with a non-empty remainder is one increment.

use std::future::Future;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::StreamError;

/// Line prefix that marks a content increment.
pub const DATA_PREFIX: &str = "data:";

/// Stateful UTF-8 decoder and line splitter.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of an incomplete code point from the previous chunk.
    undecoded: Vec<u8>,
    /// Decoded text of the current unterminated line.
    line: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns the increments completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut increments = Vec::new();
        let Some(last_newline) = self.line.rfind('\n') else {
            return increments;
        };
        let tail = self.line.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.line, tail);

        for line in complete[..last_newline].split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some(data) = line.strip_prefix(DATA_PREFIX) {
                if !data.is_empty() {
                    increments.push(data.to_owned());
                }
            }
        }
        increments
    }

    /// Text of the unterminated line carried into the next chunk.
    pub fn pending(&self) -> &str {
        &self.line
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.undecoded.extend_from_slice(chunk);
        let mut start = 0;
        while start < self.undecoded.len() {
            match std::str::from_utf8(&self.undecoded[start..]) {
                Ok(text) => {
                    self.line.push_str(text);
                    start = self.undecoded.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    let valid = std::str::from_utf8(&self.undecoded[start..valid_end]);
                    self.line.push_str(valid.unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            self.line.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + len;
                        }
                        // Incomplete sequence at the end: hold it for the next chunk.
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.undecoded.drain(..start);
    }
}

/// Source of raw body chunks. `Ok(None)` is end-of-stream.
pub trait ChunkSource {
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, StreamError>> + Send;
}

impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, StreamError> {
        self.chunk().await.map_err(|e| StreamError::Read(e.to_string()))
    }
}

/// Runs a completion callback exactly once: explicitly, or on drop.
pub struct CompletionGuard<C: FnOnce()> {
    on_complete: Option<C>,
}

impl<C: FnOnce()> CompletionGuard<C> {
    pub fn new(on_complete: C) -> Self {
        Self { on_complete: Some(on_complete) }
    }

    pub fn complete(mut self) {
        if let Some(f) = self.on_complete.take() {
            f();
        }
    }
}

impl<C: FnOnce()> Drop for CompletionGuard<C> {
    fn drop(&mut self) {
        if let Some(f) = self.on_complete.take() {
            f();
        }
    }
}

/// What happened during one [`consume`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub increments: usize,
    pub bytes: usize,
    /// Reading stopped because the cancellation token fired.
    pub cancelled: bool,
    /// Read failure that ended the stream, already logged.
    pub error: Option<StreamError>,
}

/// Read `source` to the end, delivering increments to `on_increment`.
///
/// `on_complete` runs exactly once after reading stops, whether the stream
/// ended, failed, or was cancelled, and also if this future is dropped.
/// A read error is logged and reported in the summary; it never reaches
/// `on_increment`. The source is dropped, releasing the connection, before
/// `on_complete` runs.
pub async fn consume<S, F, C>(
    mut source: S,
    mut on_increment: F,
    on_complete: C,
    cancel: CancellationToken,
) -> StreamSummary
where
    S: ChunkSource,
    F: FnMut(&str),
    C: FnOnce(),
{
    let completion = CompletionGuard::new(on_complete);
    let mut decoder = FrameDecoder::new();
    let mut summary = StreamSummary::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("chat stream cancelled");
                summary.cancelled = true;
                break;
            }
            next = source.next_chunk() => next,
        };
        match next {
            Ok(Some(chunk)) => {
                summary.bytes += chunk.len();
                for increment in decoder.feed(&chunk) {
                    summary.increments += 1;
                    on_increment(&increment);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(err = %e, increments = summary.increments, "chat stream ended with error");
                summary.error = Some(e);
                break;
            }
        }
    }

    if !decoder.pending().is_empty() {
        debug!(len = decoder.pending().len(), "discarding unterminated final line");
    }
    drop(source);
    completion.complete();
    summary
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
