// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Programmatic ONNX graph builders.
//!
//! Available to this crate's tests and, through the `fixtures` feature, to
//! downstream tests and benchmarks. Initializers carry correctly sized
//! zero-filled `raw_data` so the encoded models look like real exports.

use crate::proto::{
    DataLocation, DimensionProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto,
    StringStringEntryProto, TensorProto, TensorShapeProto, TensorTypeProto, TypeProto,
    ValueInfoProto,
};
use crate::{Dim, ElementType};
use prost::Message;

/// ONNX code for float32.
pub const FLOAT: i32 = 1;

/// Builds a declared input/output with the given element type and shape.
pub fn tensor_value(name: &str, elem_type: i32, dims: &[Dim]) -> ValueInfoProto {
    let dim = dims
        .iter()
        .map(|d| match d {
            Dim::Known(v) => DimensionProto {
                dim_value: Some(*v as i64),
                ..Default::default()
            },
            Dim::Symbolic(s) => DimensionProto {
                dim_param: Some(s.clone()),
                ..Default::default()
            },
            Dim::Unknown => DimensionProto::default(),
        })
        .collect();

    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            tensor_type: Some(TensorTypeProto {
                elem_type,
                shape: Some(TensorShapeProto { dim }),
            }),
        }),
        ..Default::default()
    }
}

/// Builds an inline initializer filled with zeros.
pub fn initializer(name: &str, dims: &[i64], data_type: i32) -> TensorProto {
    let elements: i64 = dims.iter().product();
    let width = match ElementType::from_onnx(data_type) {
        ElementType::Float16 | ElementType::BFloat16 | ElementType::Int16 | ElementType::Uint16 => 2,
        ElementType::Int8 | ElementType::Uint8 | ElementType::Bool => 1,
        ElementType::Int64 | ElementType::Uint64 | ElementType::Float64 => 8,
        _ => 4,
    };
    TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type,
        raw_data: vec![0u8; (elements.max(0) as usize) * width].into(),
        ..Default::default()
    }
}

/// Builds an initializer whose bytes live in an external file.
pub fn external_initializer(
    name: &str,
    dims: &[i64],
    data_type: i32,
    location: &str,
    offset: usize,
    length: usize,
) -> TensorProto {
    let entry = |key: &str, value: String| StringStringEntryProto {
        key: key.to_string(),
        value,
    };
    TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type,
        data_location: DataLocation::External as i32,
        external_data: vec![
            entry("location", location.to_string()),
            entry("offset", offset.to_string()),
            entry("length", length.to_string()),
        ],
        ..Default::default()
    }
}

/// Builds an operator node.
pub fn node(op_type: &str, name: &str, inputs: &[&str], outputs: &[&str]) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        name: name.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Fluent builder for a [`ModelProto`] with a graph section.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    model: ModelProto,
    graph: GraphProto,
}

impl ModelBuilder {
    pub fn new(graph_name: &str) -> Self {
        Self {
            model: ModelProto {
                ir_version: 8,
                producer_name: "silicon-fixtures".into(),
                model_version: 1,
                opset_import: vec![OperatorSetIdProto {
                    domain: String::new(),
                    version: 17,
                }],
                ..Default::default()
            },
            graph: GraphProto {
                name: graph_name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn producer(mut self, name: &str) -> Self {
        self.model.producer_name = name.to_string();
        self
    }

    pub fn input(mut self, value: ValueInfoProto) -> Self {
        self.graph.input.push(value);
        self
    }

    pub fn output(mut self, value: ValueInfoProto) -> Self {
        self.graph.output.push(value);
        self
    }

    pub fn initializer(mut self, tensor: TensorProto) -> Self {
        self.graph.initializer.push(tensor);
        self
    }

    pub fn node(mut self, node: NodeProto) -> Self {
        self.graph.node.push(node);
        self
    }

    pub fn build(mut self) -> ModelProto {
        self.model.graph = Some(self.graph);
        self.model
    }

    /// Builds and serializes to protobuf bytes.
    pub fn encode(self) -> Vec<u8> {
        self.build().encode_to_vec()
    }
}

/// One `Gemm` layer: `x[N, in] · fc.weight[in, out] → y[N, out]`.
pub fn dense_model(in_features: i64, out_features: i64) -> ModelProto {
    ModelBuilder::new("dense")
        .input(tensor_value(
            "x",
            FLOAT,
            &[Dim::Symbolic("N".into()), Dim::Known(in_features as u64)],
        ))
        .output(tensor_value(
            "y",
            FLOAT,
            &[Dim::Symbolic("N".into()), Dim::Known(out_features as u64)],
        ))
        .initializer(initializer("fc.weight", &[in_features, out_features], FLOAT))
        .node(node("Gemm", "fc", &["x", "fc.weight"], &["y"]))
        .build()
}

/// A small MNIST-style CNN:
/// `Conv(8×1×3×3, same) → Relu → MaxPool → Flatten → Gemm(1568×10) → Softmax`.
///
/// The input is declared `[1, 1, 28, 28]` and one node is left unnamed so
/// name synthesis is exercised.
pub fn cnn_model() -> ModelProto {
    let known = |dims: &[u64]| dims.iter().map(|&d| Dim::Known(d)).collect::<Vec<_>>();
    ModelBuilder::new("cnn")
        .producer("pytorch")
        .input(tensor_value("input", FLOAT, &known(&[1, 1, 28, 28])))
        .output(tensor_value("probs", FLOAT, &known(&[1, 10])))
        .initializer(initializer("conv1.weight", &[8, 1, 3, 3], FLOAT))
        .initializer(initializer("conv1.bias", &[8], FLOAT))
        .initializer(initializer("fc.weight", &[1568, 10], FLOAT))
        .initializer(initializer("fc.bias", &[10], FLOAT))
        .node(node(
            "Conv",
            "conv1",
            &["input", "conv1.weight", "conv1.bias"],
            &["c1"],
        ))
        .node(node("Relu", "relu1", &["c1"], &["r1"]))
        .node(node("MaxPool", "pool1", &["r1"], &["p1"]))
        .node(node("Flatten", "", &["p1"], &["f1"]))
        .node(node("Gemm", "fc", &["f1", "fc.weight", "fc.bias"], &["logits"]))
        .node(node("Softmax", "softmax", &["logits"], &["probs"]))
        .build()
}

/// [`dense_model`] with its weight moved to an external file named
/// `location`. Returns the encoded graph and the matching payload bytes.
pub fn external_dense_model(
    in_features: i64,
    out_features: i64,
    location: &str,
) -> (Vec<u8>, Vec<u8>) {
    let len = (in_features * out_features) as usize * 4;
    let mut model = dense_model(in_features, out_features);
    if let Some(graph) = model.graph.as_mut() {
        graph.initializer[0] = external_initializer(
            "fc.weight",
            &[in_features, out_features],
            FLOAT,
            location,
            0,
            len,
        );
    }
    let payload = (0..len).map(|i| (i % 251) as u8).collect();
    (model.encode_to_vec(), payload)
}
