// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`CompilerBackend`] trait and its output.

use crate::CompileError;
use onnx_ir::ModelInfo;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Generated source for one model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CompiledArtifact {
    pub model_name: String,
    /// Contents of `{model_name}.c`.
    pub source: String,
    /// Contents of `{model_name}.h`.
    pub header: String,
}

impl CompiledArtifact {
    pub fn source_filename(&self) -> String {
        format!("{}.c", self.model_name)
    }

    pub fn header_filename(&self) -> String {
        format!("{}.h", self.model_name)
    }

    /// Packs the artifact into a zip archive with exactly two entries,
    /// `{model_name}.c` and `{model_name}.h`.
    ///
    /// Entry timestamps are fixed, so equal artifacts yield equal bytes.
    pub fn to_zip(&self) -> Result<Vec<u8>, CompileError> {
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(self.source_filename(), options)?;
        zip.write_all(self.source.as_bytes())?;
        zip.start_file(self.header_filename(), options)?;
        zip.write_all(self.header.as_bytes())?;
        let bytes = zip.finish()?.into_inner();

        tracing::debug!(
            "archived '{}': {} bytes",
            self.model_name,
            bytes.len()
        );
        Ok(bytes)
    }
}

/// A code generator targeting microcontroller deployments.
///
/// Implementations must be deterministic: the same `(info, model_name,
/// target_chip)` always yields a byte-identical artifact. The artifact
/// cache relies on this.
pub trait CompilerBackend: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    /// Generates source for `info`.
    fn compile(
        &self,
        info: &ModelInfo,
        model_name: &str,
        target_chip: &str,
    ) -> Result<CompiledArtifact, CompileError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn artifact() -> CompiledArtifact {
        CompiledArtifact {
            model_name: "mnist".into(),
            source: "#include \"mnist.h\"\n".into(),
            header: "#pragma once\n".into(),
        }
    }

    #[test]
    fn test_filenames() {
        let a = artifact();
        assert_eq!(a.source_filename(), "mnist.c");
        assert_eq!(a.header_filename(), "mnist.h");
    }

    #[test]
    fn test_zip_has_two_entries() {
        let bytes = artifact().to_zip().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut source = String::new();
        archive
            .by_name("mnist.c")
            .unwrap()
            .read_to_string(&mut source)
            .unwrap();
        assert_eq!(source, "#include \"mnist.h\"\n");

        let mut header = String::new();
        archive
            .by_name("mnist.h")
            .unwrap()
            .read_to_string(&mut header)
            .unwrap();
        assert_eq!(header, "#pragma once\n");
    }

    #[test]
    fn test_zip_is_deterministic() {
        assert_eq!(artifact().to_zip().unwrap(), artifact().to_zip().unwrap());
    }
}
