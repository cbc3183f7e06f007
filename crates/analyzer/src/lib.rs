// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # analyzer
//!
//! The load → profile → compile pipeline behind one facade.
//!
//! - [`Upload`]: a model file and an optional `.data` weight file.
//! - [`Analyzer::load`] / [`Analyzer::profile`]: never fail; faults come
//!   back as reports with `valid == false`, a message and a [`Fault`].
//! - [`Analyzer::compile`]: code generation through a shared
//!   [`ArtifactCache`](codegen::ArtifactCache); faults are errors.
//! - [`AnalyzerConfig`]: TOML configuration: default board, extra boards,
//!   profiling defaults, cache capacity.

mod analyzer;
mod config;
mod error;
mod upload;

pub use analyzer::{Analyzer, LoadReport, ProfileReport, ProfileRequest};
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Fault};
pub use upload::Upload;
