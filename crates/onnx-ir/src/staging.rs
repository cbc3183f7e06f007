// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! In-memory staging of external weight payloads.
//!
//! An ONNX graph names its external weight file by a relative `location`
//! string, which need not match the filename an uploader used. The
//! [`StagingArea`] binds payload bytes under the name the graph expects, so
//! initializers can be resolved against it without touching the
//! filesystem.
//!
//! A staging area lives exactly as long as one load call: it is created on
//! the loader's stack and dropped on every exit path, success or error.

use bytes::Bytes;
use std::collections::HashMap;

/// Weight bytes supplied alongside a graph, with the filename the caller
/// knows them by.
#[derive(Debug, Clone)]
pub struct ExternalPayload {
    /// Caller-supplied filename (e.g. the uploaded file's name).
    pub filename: String,
    /// Raw payload bytes.
    pub bytes: Bytes,
}

impl ExternalPayload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Scoped name → payload bindings for a single load.
#[derive(Debug, Default)]
pub(crate) struct StagingArea {
    bound: HashMap<String, Bytes>,
}

impl StagingArea {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Binds `bytes` under `name`, replacing any earlier binding.
    pub(crate) fn bind(&mut self, name: &str, bytes: Bytes) {
        tracing::debug!("staging: bound {} bytes as '{}'", bytes.len(), name);
        self.bound.insert(normalize(name).to_string(), bytes);
    }

    /// Resolves a graph-recorded location to its bound payload.
    pub(crate) fn resolve(&self, location: &str) -> Option<&Bytes> {
        self.bound.get(normalize(location))
    }

    pub(crate) fn total_bytes(&self) -> usize {
        self.bound.values().map(Bytes::len).sum()
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if !self.bound.is_empty() {
            tracing::debug!(
                "staging: released {} payload(s), {} bytes",
                self.bound.len(),
                self.total_bytes(),
            );
        }
    }
}

/// `./weights.data` and `weights.data` name the same file.
fn normalize(name: &str) -> &str {
    name.strip_prefix("./").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_resolve() {
        let mut staging = StagingArea::new();
        staging.bind("model.onnx.data", Bytes::from_static(&[1, 2, 3]));
        assert_eq!(staging.resolve("model.onnx.data").unwrap().len(), 3);
        assert_eq!(staging.resolve("./model.onnx.data").unwrap().len(), 3);
        assert!(staging.resolve("other.data").is_none());
        assert_eq!(staging.total_bytes(), 3);
    }

    #[test]
    fn test_rebind_replaces() {
        let mut staging = StagingArea::new();
        staging.bind("w.data", Bytes::from_static(&[1]));
        staging.bind("./w.data", Bytes::from_static(&[1, 2]));
        assert_eq!(staging.resolve("w.data").unwrap().len(), 2);
        assert_eq!(staging.total_bytes(), 2);
    }

    #[test]
    fn test_payload_constructor() {
        let p = ExternalPayload::new("x.data", vec![0u8; 8]);
        assert_eq!(p.filename, "x.data");
        assert_eq!(p.bytes.len(), 8);
    }
}
