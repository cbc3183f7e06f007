// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Flash and RAM estimators.
//!
//! All arithmetic is on `u64` and saturates, so absurd shapes produce a
//! pinned maximum rather than a wrap-around.

use onnx_ir::{ElementType, ModelInfo, TensorDescriptor, WeightInfo};

/// Bytes per element. Quantized storage is one byte for every type;
/// unrecognised types count as four.
pub fn element_width(dtype: ElementType, quantized: bool) -> u64 {
    if quantized {
        return 1;
    }
    match dtype {
        ElementType::Float32 | ElementType::Int32 | ElementType::Uint32 => 4,
        ElementType::Float16 | ElementType::BFloat16 | ElementType::Int16 | ElementType::Uint16 => 2,
        ElementType::Int8 | ElementType::Uint8 | ElementType::Bool => 1,
        _ => 4,
    }
}

/// Storage bytes of one weight.
pub fn weight_bytes(weight: &WeightInfo, quantized: bool) -> u64 {
    weight
        .size
        .saturating_mul(element_width(weight.dtype, quantized))
}

/// Flash needed for every weight in the model.
pub fn flash_bytes(info: &ModelInfo, quantized: bool) -> u64 {
    info.weights
        .iter()
        .map(|w| weight_bytes(w, quantized))
        .fold(0, u64::saturating_add)
}

/// Buffer bytes of one declared input or output.
///
/// Symbolic, unknown and zero dimensions are replaced by `batch_size`. An
/// empty shape contributes nothing.
pub fn tensor_bytes(tensor: &TensorDescriptor, batch_size: u64, quantized: bool) -> u64 {
    if tensor.shape.is_empty() {
        return 0;
    }
    let elements = tensor
        .shape
        .iter()
        .map(|d| match d.value() {
            Some(v) if v > 0 => v,
            _ => batch_size,
        })
        .fold(1u64, u64::saturating_mul);
    elements.saturating_mul(element_width(tensor.dtype, quantized))
}

/// Breakdown of the RAM (tensor arena) estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamEstimate {
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Proxy for intermediate activations: twice the larger of the input
    /// and output buffers.
    pub intermediate_bytes: u64,
}

impl RamEstimate {
    pub fn total(&self) -> u64 {
        self.input_bytes
            .saturating_add(self.output_bytes)
            .saturating_add(self.intermediate_bytes)
    }
}

/// Estimates the arena needed to run the model once.
pub fn ram_estimate(info: &ModelInfo, batch_size: u64, quantized: bool) -> RamEstimate {
    let sum = |tensors: &[TensorDescriptor]| {
        tensors
            .iter()
            .map(|t| tensor_bytes(t, batch_size, quantized))
            .fold(0, u64::saturating_add)
    };
    let input_bytes = sum(info.inputs.as_slice());
    let output_bytes = sum(info.outputs.as_slice());
    RamEstimate {
        input_bytes,
        output_bytes,
        intermediate_bytes: input_bytes.max(output_bytes).saturating_mul(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onnx_ir::Dim;

    fn tensor(shape: Vec<Dim>, dtype: ElementType) -> TensorDescriptor {
        TensorDescriptor {
            name: "t".into(),
            shape,
            dtype,
        }
    }

    #[test]
    fn test_element_widths() {
        assert_eq!(element_width(ElementType::Float32, false), 4);
        assert_eq!(element_width(ElementType::Float16, false), 2);
        assert_eq!(element_width(ElementType::BFloat16, false), 2);
        assert_eq!(element_width(ElementType::Int8, false), 1);
        assert_eq!(element_width(ElementType::Bool, false), 1);
        assert_eq!(element_width(ElementType::Int64, false), 4);
        assert_eq!(element_width(ElementType::Unknown(14), false), 4);
        assert_eq!(element_width(ElementType::Float32, true), 1);
    }

    #[test]
    fn test_tensor_bytes_substitutes_batch() {
        let t = tensor(vec![Dim::Symbolic("N".into()), Dim::Known(784)], ElementType::Float32);
        assert_eq!(tensor_bytes(&t, 1, false), 784 * 4);
        assert_eq!(tensor_bytes(&t, 4, false), 4 * 784 * 4);
        assert_eq!(tensor_bytes(&t, 4, true), 4 * 784);

        let zero = tensor(vec![Dim::Known(0), Dim::Unknown, Dim::Known(2)], ElementType::Int8);
        assert_eq!(tensor_bytes(&zero, 3, false), 3 * 3 * 2);
    }

    #[test]
    fn test_tensor_bytes_empty_shape() {
        let t = tensor(vec![], ElementType::Float32);
        assert_eq!(tensor_bytes(&t, 8, false), 0);
    }

    fn io_model(inputs: Vec<TensorDescriptor>, outputs: Vec<TensorDescriptor>) -> ModelInfo {
        ModelInfo {
            inputs,
            outputs,
            operators: vec![],
            layers: vec![],
            weights: vec![],
            ir_version: 8,
            producer_name: "Unknown".into(),
            model_version: 1,
            total_parameters: 0,
        }
    }

    #[test]
    fn test_ram_estimate_formula() {
        let info = io_model(
            vec![
                tensor(vec![Dim::Symbolic("N".into()), Dim::Known(3)], ElementType::Float32),
                tensor(vec![Dim::Known(2), Dim::Known(2)], ElementType::Float16),
            ],
            vec![
                tensor(vec![Dim::Unknown], ElementType::Int8),
                tensor(vec![Dim::Known(5)], ElementType::Int32),
                tensor(vec![], ElementType::Float32),
            ],
        );

        // inputs: 2*3*4 + 2*2*2 = 32; outputs: 2*1 + 5*4 + 0 = 22.
        let est = ram_estimate(&info, 2, false);
        assert_eq!(est.input_bytes, 32);
        assert_eq!(est.output_bytes, 22);
        assert_eq!(est.intermediate_bytes, 2 * 32);
        assert_eq!(est.total(), 32 + 22 + 64);

        // Output side dominates once it is the larger buffer.
        let est = ram_estimate(&io_model(vec![], info.outputs.clone()), 2, false);
        assert_eq!(est.intermediate_bytes, 2 * 22);
        assert_eq!(est.total(), 22 + 44);

        // Quantized: every element is one byte.
        let est = ram_estimate(&info, 1, true);
        assert_eq!(est.input_bytes, 3 + 4);
        assert_eq!(est.output_bytes, 1 + 5);
        assert_eq!(est.total(), 7 + 6 + 14);
    }

    #[test]
    fn test_total_saturates() {
        let est = RamEstimate {
            input_bytes: u64::MAX,
            output_bytes: 1,
            intermediate_bytes: u64::MAX,
        };
        assert_eq!(est.total(), u64::MAX);
    }
}
