// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The canonical structural IR: [`ModelInfo`] and its parts.
//!
//! `ModelInfo` is built once per load by [`ModelInfo::from_graph`] and is
//! immutable afterwards. Everything downstream (profiling, code
//! generation, caching) reads it; nothing writes it.

use crate::graph::{OnnxGraph, Validated};
use crate::proto::{TensorProto, ValueInfoProto};
use crate::{format_dims, Dim, ElementType};
use std::collections::{BTreeSet, HashSet};

/// A declared graph input or output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorDescriptor {
    pub name: String,
    pub shape: Vec<Dim>,
    pub dtype: ElementType,
}

/// An initializer (weight/constant) tensor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WeightInfo {
    pub name: String,
    pub shape: Vec<u64>,
    pub dtype: ElementType,
    /// Element count: product of `shape`, 1 for a scalar.
    pub size: u64,
}

/// One operator node, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerInfo {
    /// Node name, or `{op_type}_{ordinal}` if the graph left it empty.
    pub name: String,
    pub op_type: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Structural summary of a model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelInfo {
    /// Declared inputs, excluding anything that is also an initializer.
    pub inputs: Vec<TensorDescriptor>,
    pub outputs: Vec<TensorDescriptor>,
    /// Distinct op types, sorted.
    pub operators: Vec<String>,
    pub layers: Vec<LayerInfo>,
    pub weights: Vec<WeightInfo>,
    pub ir_version: i64,
    pub producer_name: String,
    pub model_version: i64,
    pub total_parameters: u64,
}

impl ModelInfo {
    /// Builds the IR from a validated graph.
    ///
    /// Deterministic: the same graph always yields the same `ModelInfo`,
    /// with layers and weights in declaration order and operators sorted.
    pub fn from_graph(graph: &OnnxGraph<Validated>) -> Self {
        let g = graph.graph();

        let weights: Vec<WeightInfo> = g.initializer.iter().map(weight_info).collect();
        let weight_names: HashSet<&str> = weights.iter().map(|w| w.name.as_str()).collect();

        let inputs = g
            .input
            .iter()
            .filter(|vi| !weight_names.contains(vi.name.as_str()))
            .map(tensor_descriptor)
            .collect();
        let outputs = g.output.iter().map(tensor_descriptor).collect();

        let operators = g
            .node
            .iter()
            .map(|n| n.op_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let layers = g
            .node
            .iter()
            .enumerate()
            .map(|(i, n)| LayerInfo {
                name: if n.name.is_empty() {
                    format!("{}_{i}", n.op_type)
                } else {
                    n.name.clone()
                },
                op_type: n.op_type.clone(),
                inputs: n.input.clone(),
                outputs: n.output.clone(),
            })
            .collect();

        let total_parameters = weights.iter().map(|w| w.size).sum();

        let producer_name = match graph.producer_name() {
            "" => "Unknown".to_string(),
            name => name.to_string(),
        };

        Self {
            inputs,
            outputs,
            operators,
            layers,
            weights,
            ir_version: graph.ir_version(),
            producer_name,
            model_version: graph.model_version(),
            total_parameters,
        }
    }

    /// Looks up a weight by name.
    pub fn weight(&self, name: &str) -> Option<&WeightInfo> {
        self.weights.iter().find(|w| w.name == name)
    }

    /// Weights consumed by `layer`, in the layer's input order. A weight
    /// named more than once (e.g. `Mul(w, w)`) is yielded once.
    pub fn layer_weights<'a>(
        &'a self,
        layer: &'a LayerInfo,
    ) -> impl Iterator<Item = &'a WeightInfo> + 'a {
        layer
            .inputs
            .iter()
            .enumerate()
            .filter(move |(i, name)| !layer.inputs[..*i].contains(*name))
            .filter_map(move |(_, name)| self.weight(name))
    }

    /// Returns a one-line description.
    pub fn summary(&self) -> String {
        format!(
            "{} layers, {} operator types, {} weights, {} parameters (producer: {}, IR v{})",
            self.layers.len(),
            self.operators.len(),
            self.weights.len(),
            self.total_parameters,
            self.producer_name,
            self.ir_version,
        )
    }
}

impl TensorDescriptor {
    /// Returns `"name: dtype[d0, d1, ...]"`.
    pub fn summary(&self) -> String {
        format!("{}: {}{}", self.name, self.dtype, format_dims(&self.shape))
    }
}

fn tensor_descriptor(vi: &ValueInfoProto) -> TensorDescriptor {
    let tensor_type = vi.r#type.as_ref().and_then(|t| t.tensor_type.as_ref());

    let shape = tensor_type
        .and_then(|t| t.shape.as_ref())
        .map(|s| {
            s.dim
                .iter()
                .map(|d| match (d.dim_value, &d.dim_param) {
                    // Validation has already rejected negative values.
                    (Some(v), _) => Dim::Known(v.max(0) as u64),
                    (None, Some(p)) => Dim::Symbolic(p.clone()),
                    (None, None) => Dim::Unknown,
                })
                .collect()
        })
        .unwrap_or_default();

    TensorDescriptor {
        name: vi.name.clone(),
        shape,
        dtype: ElementType::from_onnx_or_float(tensor_type.map(|t| t.elem_type).unwrap_or(0)),
    }
}

fn weight_info(t: &TensorProto) -> WeightInfo {
    let shape: Vec<u64> = t.dims.iter().map(|&d| d.max(0) as u64).collect();
    let size = shape.iter().copied().fold(1u64, u64::saturating_mul);
    WeightInfo {
        name: t.name.clone(),
        shape,
        dtype: ElementType::from_onnx(t.data_type),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cnn_model, dense_model, initializer, node, tensor_value, ModelBuilder, FLOAT};
    use crate::proto::ModelProto;
    use crate::GraphLoader;
    use prost::Message;

    fn info_of(model: ModelProto) -> ModelInfo {
        let graph = OnnxGraph::new(model).validate().unwrap();
        ModelInfo::from_graph(&graph)
    }

    #[test]
    fn test_dense_model_info() {
        let info = info_of(dense_model(128, 10));
        assert_eq!(info.inputs.len(), 1);
        assert_eq!(info.inputs[0].shape, vec![Dim::Symbolic("N".into()), Dim::Known(128)]);
        assert_eq!(info.operators, vec!["Gemm"]);
        assert_eq!(info.weights[0].shape, vec![128, 10]);
        assert_eq!(info.weights[0].dtype, ElementType::Float32);
        assert_eq!(info.total_parameters, 1280);
    }

    #[test]
    fn test_total_parameters_is_sum_of_sizes() {
        let info = info_of(cnn_model());
        let sum: u64 = info.weights.iter().map(|w| w.size).sum();
        assert_eq!(info.total_parameters, sum);
        assert_eq!(sum, 8 * 9 + 8 + 1568 * 10 + 10);
    }

    #[test]
    fn test_operators_sorted_and_deduplicated() {
        let model = ModelBuilder::new("ops")
            .node(node("Relu", "a", &["x"], &["a"]))
            .node(node("Add", "b", &["a", "a"], &["b"]))
            .node(node("Relu", "c", &["b"], &["c"]))
            .build();
        let info = info_of(model);
        assert_eq!(info.operators, vec!["Add", "Relu"]);
        assert_eq!(info.layers.len(), 3);
    }

    #[test]
    fn test_weights_excluded_from_inputs() {
        // Older exporters list initializers among graph inputs.
        let mut model = dense_model(4, 2);
        model
            .graph
            .as_mut()
            .unwrap()
            .input
            .push(tensor_value("fc.weight", FLOAT, &[Dim::Known(4), Dim::Known(2)]));
        let info = info_of(model);
        assert_eq!(info.inputs.len(), 1);
        assert_eq!(info.inputs[0].name, "x");
    }

    #[test]
    fn test_unnamed_layer_gets_synthesized_name() {
        let info = info_of(cnn_model());
        assert_eq!(info.layers[3].name, "Flatten_3");
        assert_eq!(info.layers[0].name, "conv1");
    }

    #[test]
    fn test_dim_kinds() {
        let model = ModelBuilder::new("dims")
            .input(tensor_value(
                "x",
                FLOAT,
                &[Dim::Symbolic("batch".into()), Dim::Unknown, Dim::Known(3)],
            ))
            .node(node("Relu", "r", &["x"], &["y"]))
            .build();
        let info = info_of(model);
        assert_eq!(
            info.inputs[0].shape,
            vec![Dim::Symbolic("batch".into()), Dim::Unknown, Dim::Known(3)]
        );
        assert_eq!(info.inputs[0].summary(), "x: float32[batch, ?, 3]");
    }

    #[test]
    fn test_unknown_io_dtype_reports_float() {
        let model = ModelBuilder::new("dtype")
            .input(tensor_value("x", 0, &[Dim::Known(1)]))
            .initializer(initializer("c", &[2], 14))
            .node(node("Add", "add", &["x", "c"], &["y"]))
            .build();
        let info = info_of(model);
        assert_eq!(info.inputs[0].dtype, ElementType::Float32);
        assert_eq!(info.weights[0].dtype, ElementType::Unknown(14));
    }

    #[test]
    fn test_scalar_weight_has_size_one() {
        let model = ModelBuilder::new("scalar")
            .initializer(initializer("eps", &[], FLOAT))
            .node(node("Add", "add", &["x", "eps"], &["y"]))
            .build();
        let info = info_of(model);
        assert_eq!(info.weights[0].size, 1);
        assert_eq!(info.total_parameters, 1);
    }

    #[test]
    fn test_metadata_and_unknown_producer() {
        let info = info_of(cnn_model());
        assert_eq!(info.producer_name, "pytorch");
        assert_eq!(info.ir_version, 8);
        assert_eq!(info.model_version, 1);

        let anon = info_of(ModelBuilder::new("anon").producer("").node(node("Relu", "r", &["x"], &["y"])).build());
        assert_eq!(anon.producer_name, "Unknown");
    }

    #[test]
    fn test_layer_weights_lookup() {
        let info = info_of(cnn_model());
        let conv = &info.layers[0];
        let names: Vec<_> = info.layer_weights(conv).map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["conv1.weight", "conv1.bias"]);
        assert_eq!(info.layer_weights(&info.layers[1]).count(), 0);
    }

    #[test]
    fn test_layer_weights_repeated_input_counted_once() {
        let model = ModelBuilder::new("square")
            .input(tensor_value("x", FLOAT, &[Dim::Known(4)]))
            .initializer(initializer("w", &[4], FLOAT))
            .initializer(initializer("b", &[4], FLOAT))
            .node(node("Mul", "sq", &["w", "w"], &["w2"]))
            .node(node("Add", "add", &["x", "b", "w2", "b"], &["y"]))
            .build();
        let info = info_of(model);
        let sq: Vec<_> = info.layer_weights(&info.layers[0]).map(|w| w.name.as_str()).collect();
        assert_eq!(sq, vec!["w"]);
        let add: Vec<_> = info.layer_weights(&info.layers[1]).map(|w| w.name.as_str()).collect();
        assert_eq!(add, vec!["b"]);
    }

    #[test]
    fn test_deterministic_from_bytes() {
        let bytes = cnn_model().encode_to_vec();
        let a = ModelInfo::from_graph(&GraphLoader::load(bytes.clone(), None).unwrap());
        let b = ModelInfo::from_graph(&GraphLoader::load(bytes, None).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_field_names() {
        let info = info_of(dense_model(2, 2));
        let v = serde_json::to_value(&info).unwrap();
        for key in [
            "inputs",
            "outputs",
            "operators",
            "layers",
            "weights",
            "ir_version",
            "producer_name",
            "model_version",
            "total_parameters",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["layers"][0]["op_type"], "Gemm");
        assert_eq!(v["weights"][0]["dtype"], "float32");
        assert_eq!(v["inputs"][0]["shape"][0], "N");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn weight_dims() -> impl Strategy<Value = Vec<Vec<i64>>> {
            prop::collection::vec(prop::collection::vec(0i64..12, 0..4), 0..6)
        }

        proptest! {
            /// Parameters equal the summed element counts of the initializers,
            /// and names repeated within a layer never inflate that layer.
            #[test]
            fn total_parameters_is_initializer_sum(dims in weight_dims(), repeat in 1usize..4) {
                let mut builder = ModelBuilder::new("prop")
                    .input(tensor_value("x", FLOAT, &[Dim::Known(1)]));
                let names: Vec<String> = (0..dims.len()).map(|i| format!("w{i}")).collect();
                for (name, d) in names.iter().zip(&dims) {
                    builder = builder.initializer(initializer(name, d, FLOAT));
                }
                let mut inputs: Vec<&str> = vec!["x"];
                for _ in 0..repeat {
                    inputs.extend(names.iter().map(String::as_str));
                }
                let bytes = builder.node(node("Sum", "sum", &inputs, &["y"])).encode();
                let info = ModelInfo::from_graph(&GraphLoader::load(bytes, None).unwrap());

                let expected: u64 = dims.iter().map(|d| d.iter().product::<i64>() as u64).sum();
                prop_assert_eq!(info.total_parameters, expected);
                let layer_sum: u64 = info.layer_weights(&info.layers[0]).map(|w| w.size).sum();
                prop_assert_eq!(layer_sum, expected);
            }

            /// Extraction is deterministic for identical bytes.
            #[test]
            fn extraction_is_deterministic(dims in weight_dims()) {
                let mut builder = ModelBuilder::new("prop");
                for (i, d) in dims.iter().enumerate() {
                    builder = builder.initializer(initializer(&format!("w{i}"), d, FLOAT));
                }
                let bytes = builder.node(node("Relu", "", &["x"], &["y"])).encode();
                let a = ModelInfo::from_graph(&GraphLoader::load(bytes.clone(), None).unwrap());
                let b = ModelInfo::from_graph(&GraphLoader::load(bytes, None).unwrap());
                prop_assert_eq!(a, b);
            }
        }
    }
}
