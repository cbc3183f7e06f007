// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `silicon profile` command: RAM, Flash and FLOPs against a board budget.

use super::{human_bytes, read_upload, truncate};
use analyzer::ProfileRequest;
use std::path::{Path, PathBuf};

pub async fn execute(
    config: Option<&Path>,
    model: PathBuf,
    data: Option<PathBuf>,
    request: ProfileRequest,
    json: bool,
) -> anyhow::Result<()> {
    let analyzer = super::analyzer(config)?;
    let upload = read_upload(&model, data).await?;
    let report = analyzer.profile(&upload, &request);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    let profile = match (report.valid, report.profile) {
        (true, Some(profile)) => profile,
        _ => anyhow::bail!(
            "cannot profile '{}': {}",
            model.display(),
            report.error.unwrap_or_default()
        ),
    };
    if json {
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              silicon · Resource Profile              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    if report.board_fell_back {
        println!(
            "  Note: unknown board {:?}, using {}",
            report.requested_board.unwrap_or_default(),
            profile.board_name
        );
    }
    println!("  Board: {}", profile.board_name);
    println!(
        "  Mode: {} · batch {}",
        if profile.quantized { "int8" } else { "native" },
        profile.batch_size,
    );
    if let Some(res) = profile.conv_resolution {
        println!("  Conv resolution: {res}");
    }
    println!();

    // ── Budget ─────────────────────────────────────────────────
    println!(
        "  RAM:   {:>12} / {:>12}  ({:>5.1}%)",
        human_bytes(profile.ram_used),
        human_bytes(profile.ram_total),
        profile.ram_utilisation() * 100.0,
    );
    println!(
        "  Flash: {:>12} / {:>12}  ({:>5.1}%)",
        human_bytes(profile.flash_used),
        human_bytes(profile.flash_total),
        profile.flash_utilisation() * 100.0,
    );
    println!("  FLOPs: {}", profile.total_flops);
    println!(
        "  Verdict: {}",
        if profile.fits() { "FITS" } else { "DOES NOT FIT" }
    );
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!(
        "  {:<28} {:<14} {:<16} {:>10} {:>12} {:>14}",
        "Name", "Type", "Shape", "Params", "Memory", "FLOPs",
    );
    println!("  {}", "-".repeat(100));
    for layer in &profile.layers {
        println!(
            "  {:<28} {:<14} {:<16} {:>10} {:>12} {:>14}",
            truncate(&layer.name, 28),
            truncate(&layer.op_type, 14),
            truncate(&layer.shape, 16),
            layer.param_count,
            human_bytes(layer.memory_bytes),
            layer.flops,
        );
    }
    println!();
    Ok(())
}
