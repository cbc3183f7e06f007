// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod boards;
pub mod compile;
pub mod inspect;
pub mod profile;

use analyzer::{Analyzer, AnalyzerConfig, Upload};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Installs the log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds an analyzer from the optional config file.
pub fn analyzer(config: Option<&Path>) -> anyhow::Result<Analyzer> {
    let config = match config {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => AnalyzerConfig::default(),
    };
    Analyzer::new(config).context("invalid configuration")
}

/// Reads the model and optional weight file from disk.
pub async fn read_upload(model: &Path, data: Option<PathBuf>) -> anyhow::Result<Upload> {
    let bytes = tokio::fs::read(model)
        .await
        .with_context(|| format!("failed to read model '{}'", model.display()))?;
    let mut upload = Upload::new(file_name(model), bytes);

    if let Some(data) = data {
        let bytes = tokio::fs::read(&data)
            .await
            .with_context(|| format!("failed to read data file '{}'", data.display()))?;
        upload = upload.with_data(file_name(&data), bytes);
    }
    Ok(upload)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Formats a byte count with a binary unit.
pub fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b >= KB * KB {
        format!("{:.2} MB", b / (KB * KB))
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

/// Truncates a string to `max_len` characters with an ellipsis.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(5120), "5.0 KB");
        assert_eq!(human_bytes(4 * 1024 * 1024), "4.00 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("conv1", 30), "conv1");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/models/m.onnx")), "m.onnx");
    }
}
