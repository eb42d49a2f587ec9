//! Command-line parsing for the change-point detector.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/inference code. The pipeline is a single operation, so the CLI is
//! one flat argument struct rather than subcommands.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::TauPooling;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "brentcp",
    version,
    about = "Bayesian change-point detection on Brent oil log returns"
)]
pub struct Cli {
    /// Path to the input CSV (columns: Date, Log_Return).
    #[arg(long, default_value = "../data/processed/brent_log_returns.csv")]
    pub data: PathBuf,

    /// Directory for outputs (figures/ and logs/ are created inside it).
    #[arg(long, default_value = "../outputs")]
    pub output: PathBuf,

    /// Post-warm-up posterior draws retained per chain.
    #[arg(long, default_value_t = 2000)]
    pub draws: usize,

    /// Warm-up (tuning) iterations discarded per chain.
    #[arg(long, default_value_t = 1000)]
    pub tune: usize,

    /// Target acceptance rate for sigma step-size adaptation.
    #[arg(long, default_value_t = 0.95)]
    pub target_accept: f64,

    /// Number of independent chains.
    #[arg(long, default_value_t = 4)]
    pub chains: usize,

    /// Base RNG seed. Omit for a fresh seed from OS entropy (the seed used
    /// is printed so the run can be replayed).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Which chains feed the change-date resolution. `chain0` reproduces the
    /// original analysis, which used only the first chain; `pooled` averages
    /// tau over all chains.
    #[arg(long, value_enum, default_value_t = TauPooling::Chain0)]
    pub tau_pooling: TauPooling,
}
