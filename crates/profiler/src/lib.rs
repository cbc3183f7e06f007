// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # profiler
//!
//! Static resource estimates for a [`ModelInfo`](onnx_ir::ModelInfo)
//! against a [`BoardBudget`](board_catalog::BoardBudget):
//!
//! - **Flash**: bytes needed to store every weight.
//! - **RAM**: a tensor-arena proxy, `input + output + 2 × max(input, output)`,
//!   with dynamic I/O dimensions replaced by the batch size.
//! - **FLOPs**: per layer, by [`OpKind`]. Dense and convolution layers are
//!   costed from their weight shapes; everything else counts as zero.
//!
//! Nothing here executes the model or propagates shapes through the graph.
//! The estimates are coarse on purpose: they answer "could this possibly
//! fit?" before any code is generated.

mod error;
pub mod estimate;
mod op;
mod options;
mod profile;

pub use error::ProfileError;
pub use op::OpKind;
pub use options::{ConvResolution, ProfileOptions, Resolution};
pub use profile::{profile, LayerProfile, ModelProfile};
