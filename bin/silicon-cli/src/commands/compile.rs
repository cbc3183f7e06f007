// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `silicon compile` command: write generated C files or a zip archive.

use super::read_upload;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub async fn execute(
    config: Option<&Path>,
    model: PathBuf,
    data: Option<PathBuf>,
    name: String,
    target: String,
    out: PathBuf,
    zip: bool,
) -> anyhow::Result<()> {
    let analyzer = super::analyzer(config)?;
    let upload = read_upload(&model, data).await?;

    let report = analyzer.load(&upload);
    if !report.valid {
        anyhow::bail!(
            "invalid model '{}': {}",
            model.display(),
            report.error.unwrap_or_default()
        );
    }

    let artifact = analyzer
        .compile_loaded(&name, &target)
        .with_context(|| format!("failed to compile '{}' for {target}", model.display()))?;

    tokio::fs::create_dir_all(&out)
        .await
        .with_context(|| format!("failed to create '{}'", out.display()))?;

    let written = if zip {
        let path = out.join(format!("{name}_c_code.zip"));
        let archive = artifact.to_zip()?;
        tracing::debug!("archive for '{}' is {} bytes", artifact.model_name, archive.len());
        tokio::fs::write(&path, archive)
            .await
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        vec![path]
    } else {
        let source = out.join(artifact.source_filename());
        let header = out.join(artifact.header_filename());
        tokio::fs::write(&source, &artifact.source)
            .await
            .with_context(|| format!("failed to write '{}'", source.display()))?;
        tokio::fs::write(&header, &artifact.header)
            .await
            .with_context(|| format!("failed to write '{}'", header.display()))?;
        vec![source, header]
    };

    println!(
        "  Compiled '{}' for {} with {}",
        artifact.model_name,
        target,
        analyzer.backend_name()
    );
    for path in written {
        println!("   wrote {}", path.display());
    }
    Ok(())
}
