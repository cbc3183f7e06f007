// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # board-catalog
//!
//! Published RAM and Flash budgets of microcontroller-class targets.
//!
//! - [`MemorySize`]: a byte count with human-readable parsing (`"96K"`,
//!   `"4M"`).
//! - [`BoardBudget`]: one board's limits.
//! - [`BoardCatalog`]: an immutable, case-insensitive lookup table with
//!   built-in boards, configuration overrides, and fallback to a default
//!   board for unknown identifiers.

mod catalog;
mod error;
mod size;

pub use catalog::{BoardBudget, BoardCatalog, DEFAULT_BOARD};
pub use error::CatalogError;
pub use size::MemorySize;
