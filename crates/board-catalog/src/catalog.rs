// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Board budgets and the catalog that maps identifiers to them.

use crate::{CatalogError, MemorySize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of the board used when a request names none, or an unknown one.
pub const DEFAULT_BOARD: &str = "STM32F401";

/// Published memory limits of one target board.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoardBudget {
    /// Board identifier, e.g. `"ESP32"`.
    pub name: String,
    /// Working memory available to the inference arena.
    pub ram: MemorySize,
    /// Non-volatile storage available for weights.
    pub flash: MemorySize,
}

impl BoardBudget {
    pub fn new(name: impl Into<String>, ram: MemorySize, flash: MemorySize) -> Self {
        Self {
            name: name.into(),
            ram,
            flash,
        }
    }
}

impl fmt::Display for BoardBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (RAM {}, Flash {})", self.name, self.ram, self.flash)
    }
}

/// Immutable lookup table of board budgets.
///
/// Identifiers are matched case-insensitively. Every catalog holds its
/// default board, so [`resolve`](Self::resolve) always yields a budget.
///
/// # Example
/// ```
/// use board_catalog::BoardCatalog;
///
/// let catalog = BoardCatalog::builtin();
/// let (esp, fell_back) = catalog.resolve("esp32");
/// assert_eq!(esp.name, "ESP32");
/// assert!(!fell_back);
///
/// let (board, fell_back) = catalog.resolve("Z80");
/// assert_eq!(board.name, "STM32F401");
/// assert!(fell_back);
/// ```
#[derive(Debug, Clone)]
pub struct BoardCatalog {
    boards: BTreeMap<String, BoardBudget>,
    default_key: String,
}

impl BoardCatalog {
    /// The built-in boards: `STM32F401` (96 KB RAM, 512 KB Flash) and
    /// `ESP32` (320 KB RAM, 4 MB Flash). The default is `STM32F401`.
    pub fn builtin() -> Self {
        let boards = [
            BoardBudget::new(DEFAULT_BOARD, MemorySize::from_kb(96), MemorySize::from_kb(512)),
            BoardBudget::new("ESP32", MemorySize::from_kb(320), MemorySize::from_mb(4)),
        ];
        Self {
            boards: boards.into_iter().map(|b| (key(&b.name), b)).collect(),
            default_key: key(DEFAULT_BOARD),
        }
    }

    /// Returns a new catalog with `boards` added, replacing entries that
    /// share an identifier.
    pub fn with_overrides(
        &self,
        boards: impl IntoIterator<Item = BoardBudget>,
    ) -> Result<Self, CatalogError> {
        let mut next = self.clone();
        for board in boards {
            if board.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            tracing::debug!("catalog: registering {board}");
            next.boards.insert(key(&board.name), board);
        }
        Ok(next)
    }

    /// Returns a new catalog whose default board is `id`.
    pub fn with_default(&self, id: &str) -> Result<Self, CatalogError> {
        let k = key(id);
        if !self.boards.contains_key(&k) {
            return Err(CatalogError::UnknownDefault(id.to_string()));
        }
        Ok(Self {
            boards: self.boards.clone(),
            default_key: k,
        })
    }

    /// Looks up a board by identifier.
    pub fn get(&self, id: &str) -> Option<&BoardBudget> {
        self.boards.get(&key(id))
    }

    /// The default board.
    pub fn default_board(&self) -> &BoardBudget {
        // `default_key` is only ever set to a key present in `boards`.
        &self.boards[&self.default_key]
    }

    /// Resolves `id` to a budget, falling back to the default board when
    /// the identifier is unknown. The flag reports whether the fallback
    /// was taken.
    pub fn resolve(&self, id: &str) -> (&BoardBudget, bool) {
        match self.get(id) {
            Some(board) => (board, false),
            None => {
                let fallback = self.default_board();
                tracing::warn!(
                    "unknown board '{}', falling back to {}",
                    id,
                    fallback.name
                );
                (fallback, true)
            }
        }
    }

    /// Iterates over all boards, ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &BoardBudget> {
        self.boards.values()
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

impl Default for BoardCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn key(id: &str) -> String {
    id.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_budgets() {
        let catalog = BoardCatalog::builtin();
        let stm = catalog.get("STM32F401").unwrap();
        assert_eq!(stm.ram.as_bytes(), 96 * 1024);
        assert_eq!(stm.flash.as_bytes(), 512 * 1024);
        let esp = catalog.get("ESP32").unwrap();
        assert_eq!(esp.ram.as_bytes(), 320 * 1024);
        assert_eq!(esp.flash.as_bytes(), 4 * 1024 * 1024);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let catalog = BoardCatalog::builtin();
        assert_eq!(catalog.get("stm32f401").unwrap().name, "STM32F401");
        assert_eq!(catalog.get(" Esp32 ").unwrap().name, "ESP32");
    }

    #[test]
    fn test_resolve_fallback() {
        let catalog = BoardCatalog::builtin();
        let (board, fell_back) = catalog.resolve("ATmega328");
        assert_eq!(board.name, DEFAULT_BOARD);
        assert!(fell_back);
        let (board, fell_back) = catalog.resolve("ESP32");
        assert_eq!(board.name, "ESP32");
        assert!(!fell_back);
    }

    #[test]
    fn test_overrides_add_and_replace() {
        let base = BoardCatalog::builtin();
        let catalog = base
            .with_overrides([
                BoardBudget::new("NRF52840", MemorySize::from_kb(256), MemorySize::from_mb(1)),
                BoardBudget::new("esp32", MemorySize::from_kb(520), MemorySize::from_mb(4)),
            ])
            .unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("ESP32").unwrap().ram, MemorySize::from_kb(520));
        assert!(catalog.get("NRF52840").is_some());
        // The original catalog is untouched.
        assert_eq!(base.get("ESP32").unwrap().ram, MemorySize::from_kb(320));
    }

    #[test]
    fn test_override_rejects_empty_name() {
        let err = BoardCatalog::builtin()
            .with_overrides([BoardBudget::new(" ", MemorySize::from_kb(1), MemorySize::from_kb(1))])
            .unwrap_err();
        assert_eq!(err, CatalogError::EmptyName);
    }

    #[test]
    fn test_with_default() {
        let catalog = BoardCatalog::builtin().with_default("esp32").unwrap();
        assert_eq!(catalog.default_board().name, "ESP32");
        assert_eq!(catalog.resolve("unknown").0.name, "ESP32");
        assert!(matches!(
            BoardCatalog::builtin().with_default("Z80"),
            Err(CatalogError::UnknownDefault(_))
        ));
    }

    #[test]
    fn test_iter_sorted() {
        let names: Vec<_> = BoardCatalog::builtin().iter().map(|b| b.name.clone()).collect();
        assert_eq!(names, vec!["ESP32", "STM32F401"]);
    }

    #[test]
    fn test_board_from_toml() {
        let board: BoardBudget = toml::from_str(
            r#"
            name = "RP2040"
            ram = "264K"
            flash = "2M"
            "#,
        )
        .unwrap();
        assert_eq!(board.ram.as_bytes(), 264 * 1024);
        assert_eq!(board.to_string(), "RP2040 (RAM 264 KB, Flash 2 MB)");
    }
}
