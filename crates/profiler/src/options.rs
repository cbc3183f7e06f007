// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Profiling options.

use crate::ProfileError;
use onnx_ir::{Dim, ModelInfo};
use std::fmt;
use std::str::FromStr;

/// Spatial output resolution used for convolution FLOPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    pub height: u64,
    pub width: u64,
}

impl Resolution {
    pub fn new(height: u64, width: u64) -> Self {
        Self { height, width }
    }

    /// Number of output positions, `height × width`.
    pub fn positions(&self) -> u64 {
        self.height.saturating_mul(self.width)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Parses `"HxW"`, e.g. `"28x28"`. Both extents must be positive.
impl FromStr for Resolution {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProfileError::InvalidResolution(s.to_string());
        let (h, w) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let h: u64 = h.trim().parse().map_err(|_| invalid())?;
        let w: u64 = w.trim().parse().map_err(|_| invalid())?;
        if h == 0 || w == 0 {
            return Err(invalid());
        }
        Ok(Self::new(h, w))
    }
}

/// Where the convolution output resolution comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvResolution {
    /// A fixed resolution supplied by the caller.
    Explicit(Resolution),
    /// The spatial extents `[.., .., H, W]` of the first declared rank-4
    /// input whose H and W are concrete.
    #[default]
    FromInput,
}

impl ConvResolution {
    /// Resolves against a model. `None` if no usable input exists.
    pub fn resolve(&self, info: &ModelInfo) -> Option<Resolution> {
        match self {
            Self::Explicit(res) => Some(*res),
            Self::FromInput => info.inputs.iter().find_map(|input| match input.shape.as_slice() {
                [_, _, Dim::Known(h), Dim::Known(w)] if *h > 0 && *w > 0 => {
                    Some(Resolution::new(*h, *w))
                }
                _ => None,
            }),
        }
    }
}

/// Knobs for [`profile`](crate::profile).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Assume int8 storage for every weight and I/O tensor.
    pub quantized: bool,
    /// Substituted for symbolic, unknown or zero I/O dimensions.
    pub batch_size: u64,
    pub conv_resolution: ConvResolution,
}

impl ProfileOptions {
    /// Builds options, rejecting a zero batch size.
    pub fn new(
        quantized: bool,
        batch_size: u64,
        conv_resolution: ConvResolution,
    ) -> Result<Self, ProfileError> {
        if batch_size == 0 {
            return Err(ProfileError::ZeroBatchSize);
        }
        Ok(Self {
            quantized,
            batch_size,
            conv_resolution,
        })
    }

    pub fn quantized(mut self, quantized: bool) -> Self {
        self.quantized = quantized;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.conv_resolution = ConvResolution::Explicit(resolution);
        self
    }
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            quantized: false,
            batch_size: 1,
            conv_resolution: ConvResolution::FromInput,
        }
    }
}
