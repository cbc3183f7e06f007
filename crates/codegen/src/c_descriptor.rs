// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference backend: emits a C header and source describing the model.
//!
//! The output is a static description, not an inference kernel: a layer
//! table, a weight table, and size macros a firmware project can use to
//! size its tensor arena and sanity-check the deployed graph.
//!
//! ```text
//! mnist.h   include guard, target macros, counts, op-kind enum,
//!           layer/weight descriptor structs, extern tables
//! mnist.c   const layer table, const weight table
//! ```

use crate::{CompileError, CompiledArtifact, CompilerBackend, ModelDigest};
use onnx_ir::{ModelInfo, TensorDescriptor};
use profiler::OpKind;
use std::fmt::{self, Write};

/// The built-in [`CompilerBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CDescriptorBackend;

impl CDescriptorBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CompilerBackend for CDescriptorBackend {
    fn name(&self) -> &str {
        "c-descriptor"
    }

    fn compile(
        &self,
        info: &ModelInfo,
        model_name: &str,
        target_chip: &str,
    ) -> Result<CompiledArtifact, CompileError> {
        if !is_c_identifier(model_name) {
            return Err(CompileError::InvalidModelName(model_name.to_string()));
        }
        if !is_valid_target(target_chip) {
            return Err(CompileError::InvalidTarget(target_chip.to_string()));
        }

        let names = Names::new(model_name, target_chip);
        let digest = ModelDigest::of(info)?;
        let render_failed = |_: fmt::Error| CompileError::Unsupported {
            backend: self.name().to_string(),
            reason: "formatting generated source failed".into(),
        };

        let header = render_header(info, &names, &digest).map_err(render_failed)?;
        let source = render_source(info, &names).map_err(render_failed)?;

        tracing::info!(
            "compiled '{}' for {} ({} layers, {} weights, digest {})",
            model_name,
            target_chip,
            info.layers.len(),
            info.weights.len(),
            digest.short(),
        );

        Ok(CompiledArtifact {
            model_name: model_name.to_string(),
            source,
            header,
        })
    }
}

/// Identifiers derived from the model name and target.
struct Names<'a> {
    model: &'a str,
    /// Upper-case macro prefix.
    macro_prefix: String,
    target: &'a str,
    target_macro: String,
}

impl<'a> Names<'a> {
    fn new(model: &'a str, target: &'a str) -> Self {
        Self {
            model,
            macro_prefix: model.to_ascii_uppercase(),
            target,
            target_macro: target.to_ascii_uppercase().replace('-', "_"),
        }
    }
}

fn render_header(info: &ModelInfo, n: &Names<'_>, digest: &ModelDigest) -> Result<String, fmt::Error> {
    let p = &n.macro_prefix;
    let m = n.model;
    let mut out = String::new();

    writeln!(out, "/* Generated by silicon c-descriptor backend. Do not edit. */")?;
    writeln!(out, "/* model digest: {digest} */")?;
    writeln!(out)?;
    writeln!(out, "#ifndef {p}_H")?;
    writeln!(out, "#define {p}_H")?;
    writeln!(out)?;
    writeln!(out, "#include <stdint.h>")?;
    writeln!(out)?;
    writeln!(out, "#define {p}_TARGET {}", c_string(n.target))?;
    writeln!(out, "#define {p}_TARGET_{} 1", n.target_macro)?;
    writeln!(out)?;
    writeln!(out, "#define {p}_IR_VERSION {}", info.ir_version)?;
    writeln!(out, "#define {p}_NUM_LAYERS {}u", info.layers.len())?;
    writeln!(out, "#define {p}_NUM_WEIGHTS {}u", info.weights.len())?;
    writeln!(out, "#define {p}_NUM_PARAMETERS {}ull", info.total_parameters)?;
    writeln!(out, "#define {p}_NUM_INPUTS {}u", info.inputs.len())?;
    writeln!(out, "#define {p}_NUM_OUTPUTS {}u", info.outputs.len())?;
    for (i, t) in info.inputs.iter().enumerate() {
        writeln!(out, "#define {p}_INPUT{i}_ELEMENTS {}ull /* {} */", elements(t), c_comment(&t.summary()))?;
    }
    for (i, t) in info.outputs.iter().enumerate() {
        writeln!(out, "#define {p}_OUTPUT{i}_ELEMENTS {}ull /* {} */", elements(t), c_comment(&t.summary()))?;
    }
    writeln!(out)?;

    writeln!(out, "typedef enum {{")?;
    for (i, kind) in OpKind::ALL.iter().enumerate() {
        writeln!(out, "    {p}_OP_{} = {i},", kind.as_str().to_ascii_uppercase())?;
    }
    writeln!(out, "}} {m}_op_kind_t;")?;
    writeln!(out)?;

    writeln!(out, "typedef struct {{")?;
    writeln!(out, "    const char *name;")?;
    writeln!(out, "    const char *op_type;")?;
    writeln!(out, "    {m}_op_kind_t kind;")?;
    writeln!(out, "    uint64_t param_count;")?;
    writeln!(out, "}} {m}_layer_t;")?;
    writeln!(out)?;

    writeln!(out, "typedef struct {{")?;
    writeln!(out, "    const char *name;")?;
    writeln!(out, "    const char *dtype;")?;
    writeln!(out, "    uint64_t size;")?;
    writeln!(out, "}} {m}_weight_t;")?;
    writeln!(out)?;

    writeln!(out, "extern const {m}_layer_t {m}_layers[{p}_NUM_LAYERS];")?;
    if !info.weights.is_empty() {
        writeln!(out, "extern const {m}_weight_t {m}_weights[{p}_NUM_WEIGHTS];")?;
    }
    writeln!(out)?;
    writeln!(out, "#endif /* {p}_H */")?;
    Ok(out)
}

fn render_source(info: &ModelInfo, n: &Names<'_>) -> Result<String, fmt::Error> {
    let p = &n.macro_prefix;
    let m = n.model;
    let mut out = String::new();

    writeln!(out, "/* Generated by silicon c-descriptor backend. Do not edit. */")?;
    writeln!(out)?;
    writeln!(out, "#include \"{m}.h\"")?;
    writeln!(out)?;

    writeln!(out, "const {m}_layer_t {m}_layers[{p}_NUM_LAYERS] = {{")?;
    for layer in &info.layers {
        let params: u64 = info.layer_weights(layer).map(|w| w.size).sum();
        let kind = OpKind::classify(&layer.op_type).as_str().to_ascii_uppercase();
        writeln!(
            out,
            "    {{ {}, {}, {p}_OP_{kind}, {params}ull }},",
            c_string(&layer.name),
            c_string(&layer.op_type),
        )?;
    }
    writeln!(out, "}};")?;

    if !info.weights.is_empty() {
        writeln!(out)?;
        writeln!(out, "const {m}_weight_t {m}_weights[{p}_NUM_WEIGHTS] = {{")?;
        for w in &info.weights {
            writeln!(
                out,
                "    {{ {}, {}, {}ull }},",
                c_string(&w.name),
                c_string(&w.dtype.to_string()),
                w.size,
            )?;
        }
        writeln!(out, "}};")?;
    }
    Ok(out)
}

/// Element count with dynamic dimensions taken as 1.
fn elements(t: &TensorDescriptor) -> u64 {
    t.shape
        .iter()
        .map(|d| d.value().filter(|&v| v > 0).unwrap_or(1))
        .fold(1u64, u64::saturating_mul)
}

fn is_c_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_valid_target(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Quotes `s` as a C string literal. Non-printable bytes become octal
/// escapes.
fn c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for b in s.bytes() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            // `??` can start a trigraph.
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out.push('"');
    out
}

/// Makes `s` safe inside a `/* */` comment.
fn c_comment(s: &str) -> String {
    s.replace("*/", "* /")
}

#[cfg(test)]
mod tests {
    use super::*;
    use onnx_ir::fixtures::{cnn_model, dense_model};
    use onnx_ir::graph::OnnxGraph;

    fn info(model: onnx_ir::proto::ModelProto) -> ModelInfo {
        ModelInfo::from_graph(&OnnxGraph::new(model).validate().unwrap())
    }

    #[test]
    fn test_compile_is_deterministic() {
        let backend = CDescriptorBackend::new();
        let ir = info(cnn_model());
        let a = backend.compile(&ir, "model", "STM32F401").unwrap();
        let b = backend.compile(&ir, "model", "STM32F401").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_header_contents() {
        let ir = info(cnn_model());
        let a = CDescriptorBackend.compile(&ir, "mnist", "STM32F401").unwrap();
        assert!(a.header.contains("#ifndef MNIST_H"));
        assert!(a.header.contains("#define MNIST_TARGET \"STM32F401\""));
        assert!(a.header.contains("#define MNIST_TARGET_STM32F401 1"));
        assert!(a.header.contains("#define MNIST_NUM_LAYERS 6u"));
        assert!(a.header.contains("#define MNIST_NUM_WEIGHTS 4u"));
        assert!(a.header.contains("#define MNIST_NUM_PARAMETERS 15770ull"));
        assert!(a.header.contains("#define MNIST_INPUT0_ELEMENTS 784ull"));
        assert!(a.header.contains("MNIST_OP_CONV = 1,"));
        assert!(a.header.contains("} mnist_layer_t;"));
        assert!(a.header.trim_end().ends_with("#endif /* MNIST_H */"));
    }

    #[test]
    fn test_source_tables() {
        let ir = info(cnn_model());
        let a = CDescriptorBackend.compile(&ir, "mnist", "ESP32").unwrap();
        assert!(a.source.contains("#include \"mnist.h\""));
        assert!(a.source.contains("{ \"conv1\", \"Conv\", MNIST_OP_CONV, 80ull },"));
        assert!(a.source.contains("{ \"Flatten_3\", \"Flatten\", MNIST_OP_RESHAPE, 0ull },"));
        assert!(a.source.contains("{ \"fc.weight\", \"float32\", 15680ull },"));
    }

    #[test]
    fn test_rejects_bad_names() {
        let ir = info(dense_model(2, 2));
        for bad in ["", "9lives", "my-model", "a b", "módel"] {
            assert_eq!(
                CDescriptorBackend.compile(&ir, bad, "ESP32"),
                Err(CompileError::InvalidModelName(bad.to_string()))
            );
        }
        assert!(CDescriptorBackend.compile(&ir, "_ok9", "ESP32").is_ok());
    }

    #[test]
    fn test_rejects_bad_targets() {
        let ir = info(dense_model(2, 2));
        for bad in ["", "ESP 32", "stm32\"", "a/b"] {
            assert_eq!(
                CDescriptorBackend.compile(&ir, "model", bad),
                Err(CompileError::InvalidTarget(bad.to_string()))
            );
        }
        let a = CDescriptorBackend.compile(&ir, "model", "nrf52840-dk").unwrap();
        assert!(a.header.contains("#define MODEL_TARGET_NRF52840_DK 1"));
    }

    #[test]
    fn test_c_string_escaping() {
        assert_eq!(c_string("fc.weight"), "\"fc.weight\"");
        assert_eq!(c_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(c_string("x??y"), "\"x\\?\\?y\"");
        assert_eq!(c_string("tab\there"), "\"tab\\011here\"");
    }

    #[test]
    fn test_no_weight_table_without_weights() {
        use onnx_ir::fixtures::{node, ModelBuilder};
        let ir = info(ModelBuilder::new("relu").node(node("Relu", "r", &["x"], &["y"])).build());
        let a = CDescriptorBackend.compile(&ir, "relu", "ESP32").unwrap();
        assert!(!a.source.contains("relu_weights"));
        assert!(!a.header.contains("extern const relu_weight_t"));
        assert!(a.header.contains("#define RELU_NUM_WEIGHTS 0u"));
    }
}
