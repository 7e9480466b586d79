//! Command-line parsing for the Fisher error analysis.
//!
//! Argument parsing and command dispatch stay separate from the numerical code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gwfisher", version, about = "Fisher-matrix parameter errors for GW detector networks")]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate per-detector Fisher matrices and write one error report per subnetwork.
    Errors(ErrorsArgs),
    /// Summarize a detector store (signal counts and threshold passes).
    Inspect(InspectArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ErrorsArgs {
    /// Detector store JSON (thresholds, Fisher parameters, per-detector SNR and Fisher matrices).
    #[arg(long, value_name = "JSON")]
    pub store: PathBuf,

    /// Population CSV, one row per signal in store order.
    #[arg(long, value_name = "CSV")]
    pub population: PathBuf,

    /// Population name used in report file names.
    #[arg(short = 'n', long, default_value = "population")]
    pub name: String,

    /// Subnetwork to analyze: comma-separated detector indices or names (repeatable).
    /// Defaults to the whole network.
    #[arg(short = 's', long = "subnetwork", value_name = "IDS")]
    pub subnetworks: Vec<String>,

    /// Directory for the error reports.
    #[arg(short = 'o', long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Override the per-detector inclusion threshold from the store.
    #[arg(long)]
    pub detector_snr: Option<f64>,

    /// Override the network detection threshold from the store.
    #[arg(long)]
    pub network_snr: Option<f64>,

    /// Print a summary of the results.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct InspectArgs {
    /// Detector store JSON.
    #[arg(long, value_name = "JSON")]
    pub store: PathBuf,
}
