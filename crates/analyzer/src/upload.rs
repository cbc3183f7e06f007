// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Uploaded model files.

use crate::AnalyzerError;
use bytes::Bytes;
use onnx_ir::ExternalPayload;

/// A model file plus an optional external weight file, as received.
#[derive(Debug, Clone)]
pub struct Upload {
    pub model_filename: String,
    pub model_bytes: Bytes,
    pub data: Option<ExternalPayload>,
}

impl Upload {
    pub fn new(model_filename: impl Into<String>, model_bytes: impl Into<Bytes>) -> Self {
        Self {
            model_filename: model_filename.into(),
            model_bytes: model_bytes.into(),
            data: None,
        }
    }

    /// Attaches an external weight file.
    pub fn with_data(mut self, filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.data = Some(ExternalPayload::new(filename, bytes));
        self
    }

    /// Checks file types: the model must be `.onnx`, the weight file (if
    /// any) `.data`.
    pub fn check(&self) -> Result<(), AnalyzerError> {
        if !self.model_filename.ends_with(".onnx") {
            return Err(AnalyzerError::InputFormat(format!(
                "invalid file type '{}': the model file must be .onnx",
                self.model_filename
            )));
        }
        if let Some(data) = &self.data {
            if !data.filename.ends_with(".data") {
                return Err(AnalyzerError::InputFormat(format!(
                    "invalid data file type '{}': the data file must be .data",
                    data.filename
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_expected_types() {
        assert!(Upload::new("m.onnx", vec![]).check().is_ok());
        assert!(Upload::new("m.onnx", vec![])
            .with_data("m.onnx.data", vec![1])
            .check()
            .is_ok());
    }

    #[test]
    fn test_check_rejects_model_type() {
        let err = Upload::new("m.pb", vec![]).check().unwrap_err();
        assert!(err.to_string().contains("must be .onnx"));
        assert_eq!(err.fault(), crate::Fault::InputFormat);
    }

    #[test]
    fn test_check_rejects_data_type() {
        let err = Upload::new("m.onnx", vec![])
            .with_data("weights.bin", vec![1])
            .check()
            .unwrap_err();
        assert!(err.to_string().contains("must be .data"));
    }
}
