//! The analysis pipeline shared by the CLI and library callers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> model -> sample -> summarize -> export -> plots -> change date
//!
//! Control flow is strictly linear; nothing is re-entered. The CLI only adds
//! printing on top.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{ChangePointEstimate, RunConfig, SummaryTable, TimeSeriesTable};
use crate::error::AppError;
use crate::io::ingest::{self, IngestedSeries};
use crate::model::ChangePointModel;
use crate::sampler::{self, PosteriorTrace, SamplerSettings};

/// Fixed output paths, relative to the configured output directory.
pub const SUMMARY_CSV: &str = "logs/trace_summary.csv";
pub const TRACE_PLOT: &str = "figures/change_point_traceplot.png";
pub const COMPARISON_PLOT: &str = "figures/posterior_mu_comparison.png";

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedSeries,
    pub trace: PosteriorTrace,
    pub summary: SummaryTable,
    pub change_date: ChangePointEstimate,
}

impl RunOutput {
    pub fn table(&self) -> &TimeSeriesTable {
        &self.ingest.table
    }
}

/// Execute the full analysis and return the computed outputs.
///
/// Side effects: creates `figures/` and `logs/` under the output directory
/// if absent, and overwrites the summary CSV and both PNGs without warning.
pub fn run_change_point_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Output directories first, so a permissions problem surfaces before
    //    we spend minutes sampling.
    let outputs = prepare_output_dirs(&config.output_dir)?;

    // 2) Load and clean the series.
    let ingest = ingest::load_time_series(&config.data_path)?;

    // 3) Declare the model over the cleaned returns.
    let model = ChangePointModel::new(ingest.returns.clone())?;

    // 4) Draw posterior samples (one opaque blocking call).
    let settings = SamplerSettings {
        draws: config.draws,
        tune: config.tune,
        target_accept: config.target_accept,
        chains: config.chains,
        seed: config.seed,
    };
    let trace = sampler::sample(&model, &settings)?;

    // 5) Summarize and write outputs.
    let summary = crate::report::summarize(&trace);
    crate::io::export::write_summary_csv(&outputs.summary_csv, &summary)?;
    crate::plot::render_trace_plot(&outputs.trace_plot, &trace)?;
    crate::plot::render_posterior_comparison(&outputs.comparison_plot, &trace)?;

    // 6) Resolve the most probable change date.
    let change_date = crate::report::resolve_change_date(&ingest.table, &trace, config.tau_pooling)?;

    Ok(RunOutput {
        ingest,
        trace,
        summary,
        change_date,
    })
}

struct OutputPaths {
    summary_csv: PathBuf,
    trace_plot: PathBuf,
    comparison_plot: PathBuf,
}

fn prepare_output_dirs(output_dir: &Path) -> Result<OutputPaths, AppError> {
    for sub in ["figures", "logs"] {
        let dir = output_dir.join(sub);
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::output(format!(
                "Failed to create output directory '{}': {e}",
                dir.display()
            ))
        })?;
    }
    Ok(OutputPaths {
        summary_csv: output_dir.join(SUMMARY_CSV),
        trace_plot: output_dir.join(TRACE_PLOT),
        comparison_plot: output_dir.join(COMPARISON_PLOT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;
    use crate::domain::TauPooling;
    use chrono::NaiveDate;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("brentcp-pipeline-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_series_csv(dir: &Path, returns: &[f64]) -> PathBuf {
        let table = synthetic::table_from_returns(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            returns,
        );
        let path = dir.join("series.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "Date,Log_Return").unwrap();
        for row in &table.rows {
            writeln!(file, "{},{}", row.date, row.log_return).unwrap();
        }
        path
    }

    #[test]
    fn full_pipeline_produces_outputs_and_recovers_the_shift() {
        let dir = temp_dir("full");
        // 100 points, mean 0 -> 1 at index 50, noise sd 0.1.
        let returns = synthetic::shifted_series(50, 50, 0.0, 1.0, 0.1, 42).unwrap();
        let data_path = write_series_csv(&dir, &returns);

        let config = RunConfig {
            data_path,
            output_dir: dir.clone(),
            draws: 200,
            tune: 200,
            target_accept: 0.95,
            chains: 2,
            seed: Some(42),
            tau_pooling: TauPooling::Pooled,
        };

        let run = run_change_point_analysis(&config).unwrap();

        // Structural properties: files exist, summary shape holds.
        assert!(dir.join(SUMMARY_CSV).exists());
        assert!(dir.join(TRACE_PLOT).exists());
        assert!(dir.join(COMPARISON_PLOT).exists());
        assert_eq!(run.summary.rows.len(), 4);
        assert_eq!(run.table().len(), 100);

        // A 10-sigma mean shift at index 50 should be recovered tightly.
        assert!(
            (run.change_date.tau_mean - 50.0).abs() < 3.0,
            "tau mean {} far from the planted change point",
            run.change_date.tau_mean
        );
        assert!(run.change_date.index < 100);

        // Regime means within 5 posterior standard deviations of the truth
        // (statistical assertion, not exact equality).
        let mu1 = run.summary.row(crate::domain::Variable::Mu1).unwrap();
        let mu2 = run.summary.row(crate::domain::Variable::Mu2).unwrap();
        assert!(
            mu1.mean.abs() < 5.0 * mu1.sd + 0.02,
            "mu1 mean {} (sd {}) far from 0",
            mu1.mean,
            mu1.sd
        );
        assert!(
            (mu2.mean - 1.0).abs() < 5.0 * mu2.sd + 0.02,
            "mu2 mean {} (sd {}) far from 1",
            mu2.mean,
            mu2.sd
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rerun_with_same_seed_matches() {
        let dir = temp_dir("seeded");
        let returns = synthetic::shifted_series(15, 15, 0.0, 0.8, 0.1, 3).unwrap();
        let data_path = write_series_csv(&dir, &returns);

        let config = RunConfig {
            data_path,
            output_dir: dir.clone(),
            draws: 100,
            tune: 100,
            target_accept: 0.95,
            chains: 2,
            seed: Some(11),
            tau_pooling: TauPooling::Chain0,
        };

        let a = run_change_point_analysis(&config).unwrap();
        let b = run_change_point_analysis(&config).unwrap();
        assert_eq!(a.change_date.index, b.change_date.index);
        for (ra, rb) in a.summary.rows.iter().zip(&b.summary.rows) {
            assert_eq!(ra.mean.to_bits(), rb.mean.to_bits());
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_input_fails_before_any_sampling() {
        let dir = temp_dir("missing");
        let config = RunConfig {
            data_path: dir.join("nope.csv"),
            output_dir: dir.clone(),
            draws: 10,
            tune: 10,
            target_accept: 0.95,
            chains: 1,
            seed: Some(1),
            tau_pooling: TauPooling::Chain0,
        };
        let err = run_change_point_analysis(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        fs::remove_dir_all(&dir).ok();
    }
}
