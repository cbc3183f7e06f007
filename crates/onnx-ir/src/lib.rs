// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # onnx-ir
//!
//! Loads ONNX model graphs and extracts a canonical structural IR.
//!
//! - [`GraphLoader`]: decodes protobuf bytes, binds an optional external
//!   weight payload under the name the graph expects, and validates.
//! - [`OnnxGraph`]: the decoded graph with a **type-state pattern**
//!   (`Loaded` → `Validated`).
//! - [`ModelInfo`]: the immutable structural summary consumed by the
//!   profiler and code generators: inputs, outputs, layers, weights.
//! - [`proto`]: the subset of the ONNX protobuf schema this crate reads.
//!
//! # Example
//! ```no_run
//! use onnx_ir::{GraphLoader, ModelInfo};
//!
//! let bytes = std::fs::read("mnist.onnx").unwrap();
//! let graph = GraphLoader::load(bytes, None).unwrap();
//! let info = ModelInfo::from_graph(&graph);
//! for layer in &info.layers {
//!     println!("{} ({})", layer.name, layer.op_type);
//! }
//! ```

mod dtype;
mod error;
pub mod graph;
mod info;
mod loader;
pub mod proto;
mod shape;
mod staging;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use dtype::ElementType;
pub use error::LoadError;
pub use graph::OnnxGraph;
pub use info::{LayerInfo, ModelInfo, TensorDescriptor, WeightInfo};
pub use loader::GraphLoader;
pub use shape::{format_dims, Dim};
pub use staging::ExternalPayload;
