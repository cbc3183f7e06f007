// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `silicon boards` command: list board budgets.

use std::path::Path;

pub async fn execute(config: Option<&Path>) -> anyhow::Result<()> {
    let analyzer = super::analyzer(config)?;
    let catalog = analyzer.catalog();
    let default = &catalog.default_board().name;

    println!("  {:<20} {:>12} {:>12}", "Board", "RAM", "Flash");
    println!("  {}", "-".repeat(46));
    for board in catalog.iter() {
        let marker = if &board.name == default { " (default)" } else { "" };
        println!(
            "  {:<20} {:>12} {:>12}{}",
            board.name,
            board.ram.to_string(),
            board.flash.to_string(),
            marker,
        );
    }
    Ok(())
}
