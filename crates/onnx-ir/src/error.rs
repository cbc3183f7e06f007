// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph loading and validation.

/// Errors that can occur while loading or validating an interchange graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The graph stores weights out-of-band but no payload was bound for
    /// the location it names.
    #[error("external data required but not supplied (expected '{location}')")]
    MissingExternalData { location: String },

    /// The graph is structurally unusable. Decoder errors are carried
    /// verbatim in `detail`.
    #[error("{detail}")]
    StructuralInvalid { detail: String },
}

impl LoadError {
    pub(crate) fn structural(detail: impl Into<String>) -> Self {
        Self::StructuralInvalid {
            detail: detail.into(),
        }
    }
}

impl From<prost::DecodeError> for LoadError {
    fn from(err: prost::DecodeError) -> Self {
        Self::structural(err.to_string())
    }
}
