// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types and the fault taxonomy for the analyzer.

use std::fmt;

/// Coarse classification of a failure, for callers that map faults onto a
/// transport (status codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// The upload or request is malformed: wrong file type, bad option.
    InputFormat,
    /// The graph needs an external weight payload that was not supplied.
    MissingExternalData,
    /// The graph failed to decode or validate.
    StructuralInvalid,
    /// The compiler backend rejected the request.
    Compilation,
    /// Anything else: configuration, poisoned state.
    Internal,
}

impl Fault {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputFormat => "input_format",
            Self::MissingExternalData => "missing_external_data",
            Self::StructuralInvalid => "structural_invalid",
            Self::Compilation => "compilation",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the analyzer pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The upload is not of the expected file types.
    #[error("{0}")]
    InputFormat(String),

    /// A request option is invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] profiler::ProfileError),

    /// Loading or validating the graph failed.
    #[error(transparent)]
    Load(#[from] onnx_ir::LoadError),

    /// Code generation failed.
    #[error("compilation failed: {0}")]
    Compile(#[from] codegen::CompileError),

    /// No model has been loaded yet.
    #[error("no model loaded; upload an ONNX model first")]
    NoModelLoaded,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Classifies this error.
    pub fn fault(&self) -> Fault {
        match self {
            Self::InputFormat(_) | Self::InvalidRequest(_) | Self::NoModelLoaded => Fault::InputFormat,
            Self::Load(onnx_ir::LoadError::MissingExternalData { .. }) => Fault::MissingExternalData,
            Self::Load(onnx_ir::LoadError::StructuralInvalid { .. }) => Fault::StructuralInvalid,
            Self::Compile(_) => Fault::Compilation,
            Self::Config(_) => Fault::Internal,
        }
    }
}

impl From<board_catalog::CatalogError> for AnalyzerError {
    fn from(err: board_catalog::CatalogError) -> Self {
        Self::Config(err.to_string())
    }
}
