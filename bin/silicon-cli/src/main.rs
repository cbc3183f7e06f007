// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # silicon
//!
//! Command-line interface for the ONNX resource-feasibility profiler.
//!
//! ## Usage
//! ```bash
//! # Describe a model
//! silicon inspect --model ./mnist.onnx
//!
//! # Check whether it fits a board
//! silicon profile --model ./mnist.onnx --board ESP32 --quantized
//!
//! # Generate C descriptor tables
//! silicon compile --model ./mnist.onnx --name mnist --target STM32F401 --out ./gen --zip
//!
//! # List known boards
//! silicon boards
//! ```

mod commands;

use clap::{Parser, Subcommand};
use profiler::Resolution;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "silicon",
    about = "Static graph extraction and resource-feasibility profiling for ONNX models",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the inputs, outputs, layers and weights of a model.
    Inspect {
        /// Path to the `.onnx` file.
        #[arg(short, long)]
        model: PathBuf,

        /// External weight file (`.data`).
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Estimate RAM, Flash and FLOPs against a board budget.
    Profile {
        /// Path to the `.onnx` file.
        #[arg(short, long)]
        model: PathBuf,

        /// External weight file (`.data`).
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Board identifier (see `silicon boards`).
        #[arg(short, long)]
        board: Option<String>,

        /// Assume int8 storage for weights and I/O.
        #[arg(short, long, overrides_with = "no_quantized")]
        quantized: bool,

        /// Assume native storage, overriding `quantized = true` in the config.
        #[arg(long, overrides_with = "quantized")]
        no_quantized: bool,

        /// Substituted for dynamic input/output dimensions.
        #[arg(long)]
        batch_size: Option<u64>,

        /// Spatial resolution for convolution FLOPs (e.g., "224x224").
        #[arg(long)]
        input_resolution: Option<Resolution>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate C source and header for a model.
    Compile {
        /// Path to the `.onnx` file.
        #[arg(short, long)]
        model: PathBuf,

        /// External weight file (`.data`).
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Model name; must be a C identifier.
        #[arg(short, long, default_value = "model")]
        name: String,

        /// Target chip.
        #[arg(short, long, default_value = board_catalog::DEFAULT_BOARD)]
        target: String,

        /// Output directory.
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Write `{name}_c_code.zip` instead of loose files.
        #[arg(long)]
        zip: bool,
    },

    /// List the known boards and their budgets.
    Boards,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Inspect { model, data, json } => {
            commands::inspect::execute(config, model, data, json).await
        }
        Commands::Profile {
            model,
            data,
            board,
            quantized,
            no_quantized,
            batch_size,
            input_resolution,
            json,
        } => {
            let request = analyzer::ProfileRequest {
                board,
                quantized: quantization_override(quantized, no_quantized),
                batch_size,
                input_resolution,
            };
            commands::profile::execute(config, model, data, request, json).await
        }
        Commands::Compile {
            model,
            data,
            name,
            target,
            out,
            zip,
        } => commands::compile::execute(config, model, data, name, target, out, zip).await,
        Commands::Boards => commands::boards::execute(config).await,
    }
}

/// `None` leaves the configured default in place.
fn quantization_override(quantized: bool, no_quantized: bool) -> Option<bool> {
    match (quantized, no_quantized) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_quantization(args: &[&str]) -> Option<bool> {
        let mut argv = vec!["silicon", "profile", "--model", "m.onnx"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Profile {
                quantized,
                no_quantized,
                ..
            } => quantization_override(quantized, no_quantized),
            _ => panic!("expected the profile subcommand"),
        }
    }

    #[test]
    fn test_quantization_flags() {
        assert_eq!(profile_quantization(&[]), None);
        assert_eq!(profile_quantization(&["--quantized"]), Some(true));
        assert_eq!(profile_quantization(&["--no-quantized"]), Some(false));
        // The last flag wins.
        assert_eq!(profile_quantization(&["--quantized", "--no-quantized"]), Some(false));
        assert_eq!(profile_quantization(&["--no-quantized", "-q"]), Some(true));
    }

    #[test]
    fn test_input_resolution_parses() {
        let cli = Cli::try_parse_from([
            "silicon", "profile", "--model", "m.onnx", "--input-resolution", "32x32",
        ])
        .unwrap();
        match cli.command {
            Commands::Profile {
                input_resolution, ..
            } => assert_eq!(input_resolution, Some(Resolution::new(32, 32))),
            _ => panic!("expected the profile subcommand"),
        }
        assert!(Cli::try_parse_from([
            "silicon", "profile", "--model", "m.onnx", "--input-resolution", "big",
        ])
        .is_err());
    }
}
