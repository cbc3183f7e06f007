// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Two-phase graph loading with external-data binding.
//!
//! Large ONNX exports keep the graph structure in the `.onnx` file and the
//! bulk of the weights in a side file. The side file's name is recorded
//! *inside* the graph (the `location` entry of each external initializer)
//! and frequently differs from whatever name the uploader used. Loading
//! therefore happens in two phases:
//!
//! 1. **Structural pass**: decode the protobuf and find the location the
//!    graph expects, without touching external weights.
//! 2. **Bind + materialize**: stage the supplied payload under that
//!    location (or the caller's filename if the graph names none), then
//!    slice every external initializer's bytes out of it.
//!
//! Both phases work over in-memory buffers; the staging area is scoped to
//! a single [`GraphLoader::load`] call.

use crate::graph::{OnnxGraph, Validated};
use crate::proto::{DataLocation, ModelProto, TensorProto};
use crate::staging::{ExternalPayload, StagingArea};
use crate::LoadError;
use bytes::Bytes;
use prost::Message;

/// Loads interchange-format bytes into a validated [`OnnxGraph`].
///
/// # Example
/// ```no_run
/// use onnx_ir::{ExternalPayload, GraphLoader, ModelInfo};
///
/// let graph_bytes = std::fs::read("model.onnx").unwrap();
/// let weights = std::fs::read("weights.data").unwrap();
/// let payload = ExternalPayload::new("weights.data", weights);
///
/// let graph = GraphLoader::load(graph_bytes, Some(&payload)).unwrap();
/// let info = ModelInfo::from_graph(&graph);
/// println!("{} parameters", info.total_parameters);
/// ```
pub struct GraphLoader;

impl GraphLoader {
    /// Decodes, binds external data, materializes, and validates.
    ///
    /// # Errors
    /// - [`LoadError::MissingExternalData`] if the graph stores weights
    ///   externally and no payload is bound for the location it names.
    /// - [`LoadError::StructuralInvalid`] for decode failures (message
    ///   passed through from the decoder), an absent graph, an empty node
    ///   list, malformed shapes, or external ranges outside the payload.
    pub fn load(
        graph_bytes: impl Into<Bytes>,
        payload: Option<&ExternalPayload>,
    ) -> Result<OnnxGraph<Validated>, LoadError> {
        // 1. Structural pass.
        let graph_bytes: Bytes = graph_bytes.into();
        let mut model = ModelProto::decode(graph_bytes)?;
        let expected = expected_external_location(&model).map(str::to_string);
        let external_count = count_external(&model);

        if external_count > 0 && payload.is_none() {
            return Err(LoadError::MissingExternalData {
                location: expected.unwrap_or_else(|| "<unnamed>".into()),
            });
        }

        // 2. Bind + materialize.
        let mut staging = StagingArea::new();
        if let Some(payload) = payload {
            let name = expected.as_deref().unwrap_or(&payload.filename);
            if name != payload.filename {
                tracing::debug!(
                    "binding payload '{}' under graph-declared name '{}'",
                    payload.filename,
                    name,
                );
            }
            staging.bind(name, payload.bytes.clone());
        }

        if let Some(graph) = model.graph.as_mut() {
            for tensor in graph.initializer.iter_mut().filter(|t| t.is_external()) {
                materialize(tensor, &staging)?;
            }
        }

        let graph = OnnxGraph::new(model).validate()?;
        tracing::info!(
            "loaded graph: {} nodes, {} initializers ({} external, {} bytes staged)",
            graph.num_nodes(),
            graph.num_initializers(),
            external_count,
            staging.total_bytes(),
        );
        Ok(graph)
    }

    /// Runs only the structural pass and reports the external-data location
    /// the graph expects, if any.
    pub fn required_external_location(
        graph_bytes: impl Into<Bytes>,
    ) -> Result<Option<String>, LoadError> {
        let graph_bytes: Bytes = graph_bytes.into();
        let model = ModelProto::decode(graph_bytes)?;
        Ok(expected_external_location(&model).map(str::to_string))
    }
}

/// The `location` of the first initializer that declares external storage.
fn expected_external_location(model: &ModelProto) -> Option<&str> {
    model
        .graph
        .as_ref()?
        .initializer
        .iter()
        .filter(|t| t.is_external())
        .find_map(|t| t.external_entry("location"))
}

fn count_external(model: &ModelProto) -> usize {
    model
        .graph
        .as_ref()
        .map(|g| g.initializer.iter().filter(|t| t.is_external()).count())
        .unwrap_or(0)
}

/// Replaces an external reference with the bytes it points at.
fn materialize(tensor: &mut TensorProto, staging: &StagingArea) -> Result<(), LoadError> {
    let location = tensor.external_entry("location").ok_or_else(|| {
        LoadError::structural(format!(
            "initializer '{}' declares external data without a location",
            tensor.name
        ))
    })?;
    let payload = staging
        .resolve(location)
        .ok_or_else(|| LoadError::MissingExternalData {
            location: location.to_string(),
        })?;

    let offset = parse_entry(tensor, "offset")?.unwrap_or(0);
    let available = payload.len().checked_sub(offset);
    let length = match (parse_entry(tensor, "length")?, available) {
        (Some(len), _) => len,
        (None, Some(rest)) => rest,
        (None, None) => 0,
    };

    let end = offset
        .checked_add(length)
        .filter(|&end| end <= payload.len())
        .ok_or_else(|| {
            LoadError::structural(format!(
                "external data for '{}' out of range: offset {offset} + length {length} exceeds payload of {} bytes",
                tensor.name,
                payload.len()
            ))
        })?;

    let elements = tensor
        .dims
        .iter()
        .fold(1u64, |acc, &d| acc.saturating_mul(d.max(0) as u64));
    if length == 0 && elements > 0 {
        return Err(LoadError::structural(format!(
            "external data for '{}' is empty at offset {offset} but its shape {:?} holds {elements} elements",
            tensor.name, tensor.dims
        )));
    }

    tensor.raw_data = payload.slice(offset..end);
    tensor.external_data.clear();
    tensor.data_location = DataLocation::Default as i32;
    Ok(())
}

fn parse_entry(tensor: &TensorProto, key: &str) -> Result<Option<usize>, LoadError> {
    tensor
        .external_entry(key)
        .map(|v| {
            v.trim().parse::<usize>().map_err(|_| {
                LoadError::structural(format!(
                    "initializer '{}' has invalid external {key} '{v}'",
                    tensor.name
                ))
            })
        })
        .transpose()
}
