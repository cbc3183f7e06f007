// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `silicon inspect` command: display the extracted graph description.

use super::{read_upload, truncate};
use std::path::{Path, PathBuf};

pub async fn execute(
    config: Option<&Path>,
    model: PathBuf,
    data: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let analyzer = super::analyzer(config)?;
    let upload = read_upload(&model, data).await?;
    let report = analyzer.load(&upload);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    let info = match (report.valid, report.model_info) {
        (true, Some(info)) => info,
        _ => anyhow::bail!(
            "invalid model '{}': {}",
            model.display(),
            report.error.unwrap_or_default()
        ),
    };
    if json {
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              silicon · Model Inspector               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    println!("  File: {}", upload.model_filename);
    println!("  Producer: {}", info.producer_name);
    println!("  IR version: {}", info.ir_version);
    println!("  Model version: {}", info.model_version);
    println!("  Parameters: {}", info.total_parameters);
    println!("  Operators: {}", info.operators.join(", "));
    println!();

    println!("  Inputs:");
    for input in &info.inputs {
        println!("   {}", input.summary());
    }
    println!("  Outputs:");
    for output in &info.outputs {
        println!("   {}", output.summary());
    }
    println!();

    // ── Layers ─────────────────────────────────────────────────
    println!(
        "  {:<4} {:<30} {:<18} {:>8}",
        "Idx", "Name", "Op", "#W",
    );
    println!("  {}", "-".repeat(64));
    for (i, layer) in info.layers.iter().enumerate() {
        println!(
            "  {:<4} {:<30} {:<18} {:>8}",
            i,
            truncate(&layer.name, 30),
            truncate(&layer.op_type, 18),
            info.layer_weights(layer).count(),
        );
    }
    println!();

    // ── Weights ────────────────────────────────────────────────
    if !info.weights.is_empty() {
        println!("  {:<36} {:<10} {:<18} {:>10}", "Weight", "Type", "Shape", "Elements");
        println!("  {}", "-".repeat(78));
        for weight in &info.weights {
            let shape = weight
                .shape
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join("x");
            println!(
                "  {:<36} {:<10} {:<18} {:>10}",
                truncate(&weight.name, 36),
                weight.dtype.to_string(),
                truncate(&shape, 18),
                weight.size,
            );
        }
        println!();
    }
    Ok(())
}
