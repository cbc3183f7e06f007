// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the board catalog.

/// Errors that can occur while parsing sizes or assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A memory size string could not be parsed.
    #[error("invalid memory size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },

    /// A board entry has an empty identifier.
    #[error("board entry has an empty name")]
    EmptyName,

    /// The requested default board is not in the catalog.
    #[error("default board '{0}' is not in the catalog")]
    UnknownDefault(String),
}
