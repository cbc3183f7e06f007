// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-model profiling against a board budget.

use crate::estimate::{flash_bytes, ram_estimate, weight_bytes};
use crate::{OpKind, ProfileOptions, Resolution};
use board_catalog::BoardBudget;
use onnx_ir::{LayerInfo, ModelInfo, WeightInfo};

/// Per-layer cost breakdown.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerProfile {
    pub name: String,
    /// The layer's ONNX op type.
    #[serde(rename = "type")]
    pub op_type: String,
    pub kind: OpKind,
    /// Dims of the layer's first weight of rank ≥ 2 joined by `x`, or `N/A`.
    pub shape: String,
    /// Total elements of the weights this layer consumes.
    pub param_count: u64,
    /// Storage bytes of those weights.
    pub memory_bytes: u64,
    pub flops: u64,
}

/// Feasibility report for one model on one board.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelProfile {
    pub ram_used: u64,
    pub ram_total: u64,
    pub flash_used: u64,
    pub flash_total: u64,
    pub total_flops: u64,
    pub layers: Vec<LayerProfile>,
    pub board_name: String,
    pub quantized: bool,
    pub batch_size: u64,
    /// Resolution used for convolution FLOPs; `None` if the model has no
    /// convolution or none could be determined.
    pub conv_resolution: Option<Resolution>,
}

impl ModelProfile {
    /// Whether both RAM and Flash estimates are within the board budget.
    pub fn fits(&self) -> bool {
        self.ram_used <= self.ram_total && self.flash_used <= self.flash_total
    }

    /// `ram_used / ram_total`; 0 for a zero budget.
    pub fn ram_utilisation(&self) -> f64 {
        ratio(self.ram_used, self.ram_total)
    }

    /// `flash_used / flash_total`; 0 for a zero budget.
    pub fn flash_utilisation(&self) -> f64 {
        ratio(self.flash_used, self.flash_total)
    }

    /// Returns a one-line description.
    pub fn summary(&self) -> String {
        format!(
            "{}: RAM {}/{} B ({:.1}%), Flash {}/{} B ({:.1}%), {} FLOPs, {}",
            self.board_name,
            self.ram_used,
            self.ram_total,
            self.ram_utilisation() * 100.0,
            self.flash_used,
            self.flash_total,
            self.flash_utilisation() * 100.0,
            self.total_flops,
            if self.fits() { "fits" } else { "does not fit" },
        )
    }
}

fn ratio(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64
    }
}

/// Profiles `info` against `board`.
///
/// Pure: the result depends only on the three arguments.
///
/// # Example
/// ```
/// use board_catalog::BoardCatalog;
/// use onnx_ir::{ElementType, ModelInfo, LayerInfo, WeightInfo};
/// use profiler::{profile, ProfileOptions};
///
/// let info = ModelInfo {
///     inputs: vec![],
///     outputs: vec![],
///     operators: vec!["Gemm".into()],
///     layers: vec![LayerInfo {
///         name: "fc".into(),
///         op_type: "Gemm".into(),
///         inputs: vec!["x".into(), "w".into()],
///         outputs: vec!["y".into()],
///     }],
///     weights: vec![WeightInfo {
///         name: "w".into(),
///         shape: vec![128, 10],
///         dtype: ElementType::Float32,
///         size: 1280,
///     }],
///     ir_version: 8,
///     producer_name: "Unknown".into(),
///     model_version: 1,
///     total_parameters: 1280,
/// };
///
/// let catalog = BoardCatalog::builtin();
/// let p = profile(&info, catalog.default_board(), &ProfileOptions::default());
/// assert_eq!(p.flash_used, 5120);
/// assert_eq!(p.total_flops, 2560);
/// ```
pub fn profile(info: &ModelInfo, board: &BoardBudget, options: &ProfileOptions) -> ModelProfile {
    let has_conv = info
        .layers
        .iter()
        .any(|l| OpKind::classify(&l.op_type).needs_resolution());
    let resolution = if has_conv {
        let resolved = options.conv_resolution.resolve(info);
        if resolved.is_none() {
            tracing::warn!(
                "no convolution resolution available (no rank-4 input with concrete H and W); \
                 convolution FLOPs will be reported as 0"
            );
        }
        resolved
    } else {
        None
    };

    let layers: Vec<LayerProfile> = info
        .layers
        .iter()
        .map(|layer| layer_profile(info, layer, resolution, options.quantized))
        .collect();

    let total_flops = layers.iter().map(|l| l.flops).fold(0, u64::saturating_add);
    let flash_used = flash_bytes(info, options.quantized);
    let ram = ram_estimate(info, options.batch_size, options.quantized);

    let profile = ModelProfile {
        ram_used: ram.total(),
        ram_total: board.ram.as_bytes(),
        flash_used,
        flash_total: board.flash.as_bytes(),
        total_flops,
        layers,
        board_name: board.name.clone(),
        quantized: options.quantized,
        batch_size: options.batch_size,
        conv_resolution: resolution,
    };
    tracing::info!("profiled {} layers: {}", profile.layers.len(), profile.summary());
    profile
}

fn layer_profile(
    info: &ModelInfo,
    layer: &LayerInfo,
    resolution: Option<Resolution>,
    quantized: bool,
) -> LayerProfile {
    let weights: Vec<&WeightInfo> = info.layer_weights(layer).collect();
    let kind = OpKind::classify(&layer.op_type);

    let shape = weights
        .iter()
        .find(|w| w.shape.len() >= 2)
        .map(|w| {
            w.shape
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join("x")
        })
        .unwrap_or_else(|| "N/A".to_string());

    LayerProfile {
        name: layer.name.clone(),
        op_type: layer.op_type.clone(),
        kind,
        shape,
        param_count: weights.iter().map(|w| w.size).fold(0, u64::saturating_add),
        memory_bytes: weights
            .iter()
            .map(|w| weight_bytes(w, quantized))
            .fold(0, u64::saturating_add),
        flops: kind.flops(weights.iter().copied(), resolution),
    }
}
