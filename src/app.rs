//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the result to an exit code; this module:
//! - parses CLI arguments and sets up logging
//! - runs the error analysis for each requested subnetwork
//! - prints optional summaries

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ErrorsArgs, InspectArgs};
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `gwfisher` binary.
pub fn run() -> Result<(), AppError> {
    // `gwfisher --store ...` behaves like `gwfisher errors --store ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Errors(args) => handle_errors(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_errors(args: ErrorsArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    debug!(?config, "resolved run configuration");

    let out = pipeline::run_errors(&config)?;
    info!(reports = out.reports.len(), "error analysis finished");

    if config.summary {
        println!(
            "{}",
            crate::report::format_run_summary(&out.results, &out.fisher_parameters)
        );
    }
    for path in &out.reports {
        println!("{}", path.display());
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let store = crate::io::read_store(&args.store)?;
    println!(
        "{}",
        crate::report::format_store_summary(&store.network, &store.fisher_parameters)
    );
    Ok(())
}

pub fn run_config_from_args(args: &ErrorsArgs) -> RunConfig {
    RunConfig {
        store_path: args.store.clone(),
        population_path: args.population.clone(),
        population_name: args.name.clone(),
        subnetworks: args.subnetworks.clone(),
        out_dir: args.out_dir.clone(),
        detector_snr: args.detector_snr,
        network_snr: args.network_snr,
        summary: args.summary,
    }
}

/// Rewrite argv so a bare flag list runs `errors`.
///
/// Rules:
/// - `gwfisher --store s.json ...`    -> `gwfisher errors --store s.json ...`
/// - `gwfisher -v --store s.json ...` -> `gwfisher errors -v --store s.json ...`
/// - `gwfisher`, `--help`, `--version` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "errors" | "inspect");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        let has_subcommand = argv[1..].iter().any(|a| matches!(a.as_str(), "errors" | "inspect"));
        if !has_subcommand {
            argv.insert(1, "errors".to_string());
        }
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flags_default_to_errors() {
        assert_eq!(
            rewrite_args(args(&["gwfisher", "--store", "s.json"])),
            args(&["gwfisher", "errors", "--store", "s.json"])
        );
    }

    #[test]
    fn explicit_subcommands_untouched() {
        let a = args(&["gwfisher", "inspect", "--store", "s.json"]);
        assert_eq!(rewrite_args(a.clone()), a);
        let b = args(&["gwfisher", "-v", "inspect", "--store", "s.json"]);
        assert_eq!(rewrite_args(b.clone()), b);
        let c = args(&["gwfisher", "--help"]);
        assert_eq!(rewrite_args(c.clone()), c);
    }

    #[test]
    fn cli_parses_into_run_config() {
        let cli = crate::cli::Cli::parse_from(args(&[
            "gwfisher",
            "errors",
            "--store",
            "s.json",
            "--population",
            "p.csv",
            "-n",
            "BNS",
            "-s",
            "0,1",
            "-s",
            "ET",
            "--network-snr",
            "12",
            "--summary",
        ]));
        let Command::Errors(e) = cli.command else {
            panic!("expected errors subcommand");
        };
        let config = run_config_from_args(&e);
        assert_eq!(config.population_name, "BNS");
        assert_eq!(config.subnetworks, vec!["0,1".to_string(), "ET".to_string()]);
        assert_eq!(config.network_snr, Some(12.0));
        assert_eq!(config.detector_snr, None);
        assert!(config.summary);
    }
}
