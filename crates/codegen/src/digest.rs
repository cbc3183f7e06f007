// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Content identity of a [`ModelInfo`].

use crate::CompileError;
use onnx_ir::ModelInfo;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of the canonical JSON encoding of a [`ModelInfo`].
///
/// Two structurally identical models share a digest regardless of where
/// their bytes came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelDigest([u8; 32]);

impl ModelDigest {
    pub fn of(info: &ModelInfo) -> Result<Self, CompileError> {
        // Field order is fixed by the struct definitions, so the encoding
        // is canonical.
        sha256_json(info).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 12 hex digits, for logs.
    pub fn short(&self) -> String {
        self.to_string()[..12].to_string()
    }
}

fn sha256_json<T: Serialize + ?Sized>(value: &T) -> Result<[u8; 32], CompileError> {
    let json = serde_json::to_vec(value).map_err(|e| CompileError::Digest(e.to_string()))?;
    Ok(Sha256::digest(&json).into())
}

impl fmt::Display for ModelDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ModelDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelDigest({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onnx_ir::fixtures::{cnn_model, dense_model};
    use onnx_ir::graph::OnnxGraph;

    fn info(model: onnx_ir::proto::ModelProto) -> ModelInfo {
        ModelInfo::from_graph(&OnnxGraph::new(model).validate().unwrap())
    }

    fn digest(model: onnx_ir::proto::ModelProto) -> ModelDigest {
        ModelDigest::of(&info(model)).unwrap()
    }

    #[test]
    fn test_same_structure_same_digest() {
        assert_eq!(digest(cnn_model()), digest(cnn_model()));
    }

    #[test]
    fn test_different_structure_different_digest() {
        let a = digest(dense_model(4, 2));
        let b = digest(dense_model(4, 3));
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_sha256_of_json() {
        let i = info(dense_model(8, 8));
        let json = serde_json::to_vec(&i).unwrap();
        let expected: [u8; 32] = Sha256::digest(&json).into();
        assert_eq!(ModelDigest::of(&i).unwrap().as_bytes(), &expected);
    }

    #[test]
    fn test_hex_display() {
        let d = digest(dense_model(2, 2));
        let hex = d.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(d.short(), hex[..12]);
    }

    #[test]
    fn test_unencodable_value_is_an_error() {
        // JSON object keys must be strings.
        let mut map = std::collections::HashMap::new();
        map.insert((1u8, 2u8), 3u8);
        let err = sha256_json(&map).unwrap_err();
        assert!(matches!(err, CompileError::Digest(_)), "{err:?}");
        assert!(err.to_string().starts_with("cannot compute model digest"));
    }
}
