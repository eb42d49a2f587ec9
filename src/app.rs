//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the analysis pipeline once
//! - prints the resolved change date and the posterior summary table

use clap::Parser;

use crate::cli::Cli;
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `brentcp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = run_config_from_args(&cli);

    let run = pipeline::run_change_point_analysis(&config)?;

    println!(
        "{}",
        crate::report::format::format_run_summary(&run.ingest, &run.trace)
    );
    println!(
        "{}",
        crate::report::format::format_change_date(&run.change_date, config.tau_pooling)
    );
    println!();
    println!(
        "{}",
        crate::report::format::format_summary_table(&run.summary)
    );

    Ok(())
}

pub fn run_config_from_args(cli: &Cli) -> RunConfig {
    RunConfig {
        data_path: cli.data.clone(),
        output_dir: cli.output.clone(),
        draws: cli.draws,
        tune: cli.tune,
        target_accept: cli.target_accept,
        chains: cli.chains,
        seed: cli.seed,
        tau_pooling: cli.tau_pooling,
    }
}
