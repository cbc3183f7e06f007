// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Decoded interchange graph with a validation type-state.
//!
//! # Type-State Pattern
//!
//! ```text
//! OnnxGraph<Loaded>    : decoded, external weights bound, not yet checked.
//!       │  .validate()
//!       ▼
//! OnnxGraph<Validated> : structure verified, ready for IR extraction.
//! ```
//!
//! [`ModelInfo::from_graph`](crate::ModelInfo::from_graph) only accepts a
//! validated graph, so the IR builder never sees an absent graph section or
//! a malformed shape.

use crate::proto::{GraphProto, ModelProto, ValueInfoProto};
use crate::LoadError;
use std::collections::HashSet;
use std::fmt;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph decoded and materialized, not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph validated.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── OnnxGraph ──────────────────────────────────────────────────────

/// A decoded ONNX model. The generic parameter `S` records whether the
/// structure has been checked.
#[derive(Debug, Clone)]
pub struct OnnxGraph<S: GraphState = Loaded> {
    /// Model-level metadata. Its `graph` field is always `None`; the graph
    /// itself lives in `graph` below.
    header: ModelProto,
    graph: GraphProto,
    /// Whether the decoded model carried a graph section at all.
    has_graph: bool,
    _state: std::marker::PhantomData<S>,
}

impl<S: GraphState> OnnxGraph<S> {
    /// ONNX IR version recorded in the model.
    pub fn ir_version(&self) -> i64 {
        self.header.ir_version
    }

    /// Producer name recorded in the model (may be empty).
    pub fn producer_name(&self) -> &str {
        &self.header.producer_name
    }

    /// Model version recorded in the model.
    pub fn model_version(&self) -> i64 {
        self.header.model_version
    }

    /// Number of operator nodes.
    pub fn num_nodes(&self) -> usize {
        self.graph.node.len()
    }

    /// Number of initializers.
    pub fn num_initializers(&self) -> usize {
        self.graph.initializer.len()
    }
}

// ── Loaded state ───────────────────────────────────────────────────

impl OnnxGraph<Loaded> {
    /// Wraps a decoded model in the `Loaded` state.
    pub fn new(mut model: ModelProto) -> Self {
        let graph = model.graph.take();
        Self {
            header: model,
            has_graph: graph.is_some(),
            graph: graph.unwrap_or_default(),
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the structure and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The model has a graph section.
    /// - The graph has at least one node, and every node names its op type.
    /// - No declared input, output, or value-info shape has a negative
    ///   dimension value.
    /// - No initializer has a negative dimension.
    /// - Initializer names are unique.
    pub fn validate(self) -> Result<OnnxGraph<Validated>, LoadError> {
        if !self.has_graph {
            return Err(LoadError::structural("model has no graph"));
        }
        if self.graph.node.is_empty() {
            return Err(LoadError::structural("model graph has no nodes"));
        }

        for (i, node) in self.graph.node.iter().enumerate() {
            if node.op_type.is_empty() {
                return Err(LoadError::structural(format!(
                    "node {i} ('{}') has no op_type",
                    node.name
                )));
            }
        }

        let value_infos = self
            .graph
            .input
            .iter()
            .chain(&self.graph.output)
            .chain(&self.graph.value_info);
        for vi in value_infos {
            check_value_info_shape(vi)?;
        }

        let mut seen = HashSet::new();
        for init in &self.graph.initializer {
            if let Some(&d) = init.dims.iter().find(|&&d| d < 0) {
                return Err(LoadError::structural(format!(
                    "initializer '{}' has malformed shape: dimension {d}",
                    init.name
                )));
            }
            if !seen.insert(init.name.as_str()) {
                return Err(LoadError::structural(format!(
                    "duplicate initializer name '{}'",
                    init.name
                )));
            }
        }

        let dangling = self
            .graph
            .node
            .iter()
            .flat_map(|n| n.input.iter())
            .filter(|name| !name.is_empty())
            .filter(|name| !self.is_known_value(name))
            .count();
        if dangling > 0 {
            // Producers sometimes omit value-info for intermediates; the
            // structural IR does not need them, so this is only a hint.
            tracing::warn!("{dangling} node input(s) reference values with no producer");
        }

        Ok(OnnxGraph {
            header: self.header,
            graph: self.graph,
            has_graph: true,
            _state: std::marker::PhantomData,
        })
    }

    fn is_known_value(&self, name: &str) -> bool {
        self.graph.input.iter().any(|v| v.name == name)
            || self.graph.initializer.iter().any(|t| t.name == name)
            || self
                .graph
                .node
                .iter()
                .any(|n| n.output.iter().any(|o| o == name))
    }
}

fn check_value_info_shape(vi: &ValueInfoProto) -> Result<(), LoadError> {
    let dims = vi
        .r#type
        .as_ref()
        .and_then(|t| t.tensor_type.as_ref())
        .and_then(|t| t.shape.as_ref())
        .map(|s| s.dim.as_slice())
        .unwrap_or_default();

    match dims.iter().find_map(|d| d.dim_value.filter(|v| *v < 0)) {
        Some(v) => Err(LoadError::structural(format!(
            "tensor '{}' has malformed shape: dimension {v}",
            vi.name
        ))),
        None => Ok(()),
    }
}

// ── Validated state ────────────────────────────────────────────────

impl OnnxGraph<Validated> {
    /// The validated graph section.
    pub fn graph(&self) -> &GraphProto {
        &self.graph
    }

    /// Returns a one-line description.
    pub fn summary(&self) -> String {
        let producer = if self.producer_name().is_empty() {
            "unknown producer"
        } else {
            self.producer_name()
        };
        format!(
            "ONNX graph '{}' (IR v{}, {}): {} nodes, {} initializers, {} inputs, {} outputs",
            self.graph.name,
            self.ir_version(),
            producer,
            self.num_nodes(),
            self.num_initializers(),
            self.graph.input.len(),
            self.graph.output.len(),
        )
    }
}

impl<S: GraphState> fmt::Display for OnnxGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OnnxGraph '{}' ({} nodes):", self.graph.name, self.num_nodes())?;
        for (i, node) in self.graph.node.iter().enumerate() {
            writeln!(
                f,
                "  [{i}] {} ({}) {:?} -> {:?}",
                node.name, node.op_type, node.input, node.output
            )?;
        }
        Ok(())
    }
}
