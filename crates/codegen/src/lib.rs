// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # codegen
//!
//! Turns a [`ModelInfo`](onnx_ir::ModelInfo) into deployable source text.
//!
//! - [`CompilerBackend`]: the seam for code generators. Backends are
//!   deterministic per `(model, name, target)`.
//! - [`CDescriptorBackend`]: the built-in backend: a C header and source
//!   with layer and weight descriptor tables.
//! - [`ArtifactCache`]: a bounded LRU keyed by [`ModelDigest`], target
//!   and model name, shared through an `Arc`.
//! - [`CompiledArtifact::to_zip`]: exports `{name}.c` and `{name}.h` as a
//!   zip archive.
//!
//! # Example
//! ```
//! use codegen::{CDescriptorBackend, CompilerBackend};
//! use onnx_ir::{LayerInfo, ModelInfo};
//!
//! let info = ModelInfo {
//!     inputs: vec![],
//!     outputs: vec![],
//!     operators: vec!["Relu".into()],
//!     layers: vec![LayerInfo {
//!         name: "relu".into(),
//!         op_type: "Relu".into(),
//!         inputs: vec!["x".into()],
//!         outputs: vec!["y".into()],
//!     }],
//!     weights: vec![],
//!     ir_version: 8,
//!     producer_name: "Unknown".into(),
//!     model_version: 1,
//!     total_parameters: 0,
//! };
//!
//! let artifact = CDescriptorBackend.compile(&info, "tiny", "STM32F401").unwrap();
//! assert!(artifact.header.contains("#define TINY_NUM_LAYERS 1u"));
//! ```

mod backend;
mod c_descriptor;
mod cache;
mod digest;
mod error;

pub use backend::{CompiledArtifact, CompilerBackend};
pub use c_descriptor::CDescriptorBackend;
pub use cache::{ArtifactCache, CacheKey, CacheStats};
pub use digest::ModelDigest;
pub use error::CompileError;
