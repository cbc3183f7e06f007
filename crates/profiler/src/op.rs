// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Operator classification and per-kind FLOP formulas.

use crate::Resolution;
use onnx_ir::WeightInfo;
use std::fmt;

/// The kind of computation an operator performs, as far as cost
/// estimation is concerned.
///
/// Classification is total: any op type not listed maps to
/// [`OpKind::Other`], which costs zero FLOPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Fully-connected / matrix multiply.
    Dense,
    /// 2-D convolution.
    Conv,
    Pooling,
    Activation,
    Normalization,
    /// Layout-only ops: reshape, flatten, transpose, concat, ...
    Reshape,
    /// Element-wise arithmetic.
    Elementwise,
    Other,
}

impl OpKind {
    /// Every kind, in declaration order.
    pub const ALL: [OpKind; 8] = [
        Self::Dense,
        Self::Conv,
        Self::Pooling,
        Self::Activation,
        Self::Normalization,
        Self::Reshape,
        Self::Elementwise,
        Self::Other,
    ];

    /// Classifies an ONNX op type. Case-insensitive.
    pub fn classify(op_type: &str) -> Self {
        match op_type.to_ascii_lowercase().as_str() {
            "gemm" | "matmul" | "dense" | "fc" | "fullyconnected" => Self::Dense,
            "conv" | "conv2d" | "convolution" => Self::Conv,
            "maxpool" | "averagepool" | "globalaveragepool" | "globalmaxpool" | "lppool" => {
                Self::Pooling
            }
            "relu" | "leakyrelu" | "prelu" | "sigmoid" | "hardsigmoid" | "tanh" | "softmax"
            | "logsoftmax" | "gelu" | "elu" | "selu" | "hardswish" | "softplus" | "clip" => {
                Self::Activation
            }
            "batchnormalization" | "layernormalization" | "instancenormalization"
            | "groupnormalization" | "lrn" => Self::Normalization,
            "reshape" | "flatten" | "transpose" | "squeeze" | "unsqueeze" | "concat" | "split"
            | "slice" | "gather" | "identity" => Self::Reshape,
            "add" | "sub" | "mul" | "div" | "pow" | "sqrt" | "exp" | "log" | "abs" | "neg"
            | "max" | "min" | "sum" => Self::Elementwise,
            _ => Self::Other,
        }
    }

    /// Whether this kind's FLOP count depends on a spatial resolution.
    pub fn needs_resolution(self) -> bool {
        self == Self::Conv
    }

    /// Estimates FLOPs from the weights a layer consumes.
    ///
    /// - `Dense`: the first rank-2 weight `[in, out]` gives `2 × in × out`.
    /// - `Conv`: the first rank-4 weight `[co, ci, kh, kw]` (OIHW) gives
    ///   `(kh × kw × ci) × (h × w × co)`, with `h × w` the output
    ///   positions from `resolution`. Zero without a resolution.
    /// - every other kind: zero.
    pub fn flops<'a>(
        self,
        weights: impl IntoIterator<Item = &'a WeightInfo>,
        resolution: Option<Resolution>,
    ) -> u64 {
        match self {
            Self::Dense => weights
                .into_iter()
                .find_map(|w| match w.shape.as_slice() {
                    &[inp, out] => Some(2u64.saturating_mul(inp).saturating_mul(out)),
                    _ => None,
                })
                .unwrap_or(0),
            Self::Conv => {
                let Some(res) = resolution else {
                    return 0;
                };
                weights
                    .into_iter()
                    .find_map(|w| match w.shape.as_slice() {
                        &[co, ci, kh, kw] => Some(
                            kh.saturating_mul(kw)
                                .saturating_mul(ci)
                                .saturating_mul(res.positions().saturating_mul(co)),
                        ),
                        _ => None,
                    })
                    .unwrap_or(0)
            }
            Self::Pooling
            | Self::Activation
            | Self::Normalization
            | Self::Reshape
            | Self::Elementwise
            | Self::Other => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Conv => "conv",
            Self::Pooling => "pooling",
            Self::Activation => "activation",
            Self::Normalization => "normalization",
            Self::Reshape => "reshape",
            Self::Elementwise => "elementwise",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
