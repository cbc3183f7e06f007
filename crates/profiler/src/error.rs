// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for profiling options.

/// Errors raised while building [`ProfileOptions`](crate::ProfileOptions).
///
/// Profiling itself is infallible once options are valid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    /// A resolution string was not of the form `HxW` with positive extents.
    #[error("invalid resolution '{0}': expected HxW, e.g. 28x28")]
    InvalidResolution(String),

    /// Batch size must be at least 1.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}
