// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Analyzer configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! default_board = "STM32F401"
//! batch_size = 1
//! quantized = false
//! input_resolution = "28x28"
//! cache_capacity = 8
//!
//! [[boards]]
//! name = "NRF52840"
//! ram = "256K"
//! flash = "1M"
//! ```
//!
//! Every key is optional.

use crate::AnalyzerError;
use board_catalog::{BoardBudget, BoardCatalog, DEFAULT_BOARD};
use profiler::{ConvResolution, ProfileOptions, Resolution};
use std::path::Path;

/// Configuration for the [`Analyzer`](crate::Analyzer).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Board used when a request names none, or an unknown one.
    pub default_board: String,
    /// Default batch size substituted for dynamic I/O dimensions.
    pub batch_size: u64,
    /// Default quantization assumption.
    pub quantized: bool,
    /// Fixed convolution resolution (`"HxW"`). When absent, the resolution
    /// is read from the model's first rank-4 input.
    pub input_resolution: Option<String>,
    /// Maximum number of compiled artifacts kept in memory.
    pub cache_capacity: usize,
    /// Extra boards, added to or replacing the built-in ones.
    pub boards: Vec<BoardBudget>,
}

impl AnalyzerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, AnalyzerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyzerError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, AnalyzerError> {
        toml::from_str(toml_str)
            .map_err(|e| AnalyzerError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, AnalyzerError> {
        toml::to_string_pretty(self)
            .map_err(|e| AnalyzerError::Config(format!("TOML serialise error: {e}")))
    }

    /// Builds the board catalog: built-ins, then `boards`, with
    /// `default_board` as the fallback.
    pub fn build_catalog(&self) -> Result<BoardCatalog, AnalyzerError> {
        let catalog = BoardCatalog::builtin()
            .with_overrides(self.boards.iter().cloned())?
            .with_default(&self.default_board)?;
        Ok(catalog)
    }

    /// Default profiling options derived from this config.
    pub fn profile_options(&self) -> Result<ProfileOptions, AnalyzerError> {
        let conv_resolution = match &self.input_resolution {
            Some(s) => ConvResolution::Explicit(s.parse::<Resolution>()?),
            None => ConvResolution::FromInput,
        };
        Ok(ProfileOptions::new(
            self.quantized,
            self.batch_size,
            conv_resolution,
        )?)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_board: DEFAULT_BOARD.to_string(),
            batch_size: 1,
            quantized: false,
            input_resolution: None,
            cache_capacity: 8,
            boards: Vec::new(),
        }
    }
}
