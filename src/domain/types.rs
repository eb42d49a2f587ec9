//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while sampling
//! - exported to CSV
//! - returned to library callers embedding the pipeline

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One cleaned input row: a trading day and its log-return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub log_return: f64,
}

/// The cleaned input series, in file order (no re-sorting is performed).
///
/// Invariants (enforced by ingest):
/// - at least one row
/// - every `log_return` is finite
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesTable {
    pub rows: Vec<Observation>,
}

impl TimeSeriesTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Date at a given row index, if in range.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.rows.get(index).map(|r| r.date)
    }

    /// The log-return column as a flat vector (the sampler's observed data).
    pub fn returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.log_return).collect()
    }
}

/// Which chains feed the change-date resolution.
///
/// The original analysis used **chain 0 only** — likely unintentional, but it
/// is observable behavior, so both variants are exposed and `chain0` stays
/// the default. See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TauPooling {
    /// Mean of tau draws from chain 0 only (original behavior).
    Chain0,
    /// Mean of tau draws pooled across all chains.
    Pooled,
}

/// Latent variables of the change-point model, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Mu1,
    Mu2,
    Tau,
    Sigma,
}

impl Variable {
    /// Report/export order: one row per variable, always these four.
    pub const ALL: [Variable; 4] = [Variable::Mu1, Variable::Mu2, Variable::Tau, Variable::Sigma];

    pub fn display_name(self) -> &'static str {
        match self {
            Variable::Mu1 => "mu1",
            Variable::Mu2 => "mu2",
            Variable::Tau => "tau",
            Variable::Sigma => "sigma",
        }
    }
}

/// Posterior summary for a single latent variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSummary {
    pub variable: Variable,
    pub mean: f64,
    pub sd: f64,
    /// Lower bound of the 94% highest-density interval.
    pub hdi_low: f64,
    /// Upper bound of the 94% highest-density interval.
    pub hdi_high: f64,
    /// Effective sample size (autocorrelation-adjusted, summed over chains).
    pub ess: f64,
    /// Split-chain potential scale reduction factor.
    pub r_hat: f64,
}

/// Per-variable posterior summaries, one row per latent variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTable {
    pub rows: Vec<ParamSummary>,
}

impl SummaryTable {
    pub fn row(&self, variable: Variable) -> Option<&ParamSummary> {
        self.rows.iter().find(|r| r.variable == variable)
    }
}

/// The resolved change point: a row index into the input table and its date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChangePointEstimate {
    /// Mean of the tau draws used for resolution (before truncation).
    pub tau_mean: f64,
    /// `tau_mean` truncated toward zero; a valid row index by construction.
    pub index: usize,
    pub date: NaiveDate,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,

    /// Post-warm-up draws retained per chain.
    pub draws: usize,
    /// Warm-up iterations discarded per chain (step-size adaptation happens here).
    pub tune: usize,
    /// Target acceptance rate for the sigma step-size adaptation.
    pub target_accept: f64,
    /// Number of independent chains.
    pub chains: usize,
    /// Base RNG seed; `None` draws one from OS entropy (reported after the run).
    pub seed: Option<u64>,

    pub tau_pooling: TauPooling,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("../data/processed/brent_log_returns.csv"),
            output_dir: PathBuf::from("../outputs"),
            draws: 2000,
            tune: 1000,
            target_accept: 0.95,
            chains: 4,
            seed: None,
            tau_pooling: TauPooling::Chain0,
        }
    }
}
