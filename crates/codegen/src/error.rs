// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for code generation.

/// Errors that can occur while compiling a model or exporting an artifact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The model name cannot be used as a C identifier.
    #[error("invalid model name '{0}': expected a C identifier ([A-Za-z_][A-Za-z0-9_]*)")]
    InvalidModelName(String),

    /// The target chip identifier is empty or contains illegal characters.
    #[error("invalid target chip '{0}': expected letters, digits, '_' or '-'")]
    InvalidTarget(String),

    /// The backend cannot handle this model.
    #[error("backend '{backend}' cannot compile model: {reason}")]
    Unsupported { backend: String, reason: String },

    /// The model description could not be encoded for hashing.
    #[error("cannot compute model digest: {0}")]
    Digest(String),

    /// Building the export archive failed.
    #[error("archive export failed: {0}")]
    Archive(String),
}

impl From<zip::result::ZipError> for CompileError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::Archive(err.to_string())
    }
}
