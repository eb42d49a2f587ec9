//! Posterior reporting: summary table and change-date resolution.
//!
//! Formatting for the terminal lives in `format`; this module computes the
//! values so the math stays testable without string comparisons.

use crate::domain::{
    ChangePointEstimate, ParamSummary, SummaryTable, TauPooling, TimeSeriesTable, Variable,
};
use crate::error::AppError;
use crate::sampler::PosteriorTrace;
use crate::stats;

pub mod format;

/// Build the per-variable summary table (one row per latent variable, in the
/// fixed order mu1, mu2, tau, sigma).
pub fn summarize(trace: &PosteriorTrace) -> SummaryTable {
    let rows = Variable::ALL
        .iter()
        .map(|&variable| {
            let chains = variable_chains(trace, variable);
            summarize_variable(variable, &chains)
        })
        .collect();
    SummaryTable { rows }
}

fn variable_chains(trace: &PosteriorTrace, variable: Variable) -> Vec<Vec<f64>> {
    trace
        .chains
        .iter()
        .map(|c| match variable {
            Variable::Mu1 => c.mu1.clone(),
            Variable::Mu2 => c.mu2.clone(),
            Variable::Tau => c.tau.iter().map(|&t| t as f64).collect(),
            Variable::Sigma => c.sigma.clone(),
        })
        .collect()
}

fn summarize_variable(variable: Variable, chains: &[Vec<f64>]) -> ParamSummary {
    let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
    let (hdi_low, hdi_high) = stats::hdi(&pooled, stats::HDI_PROB);

    ParamSummary {
        variable,
        mean: stats::mean(&pooled),
        sd: stats::std_dev(&pooled),
        hdi_low,
        hdi_high,
        ess: stats::ess_multi(chains),
        r_hat: stats::split_r_hat(chains),
    }
}

/// Resolve the most probable change date.
///
/// The mean of the tau draws (chain 0 only, or pooled — see `TauPooling`)
/// is truncated toward zero and used as a row index into the input table.
///
/// Bounds policy: a truncated index of `n` means the posterior puts the
/// change at/after the end of the series, so there is no in-sample change
/// date; that is reported as a descriptive error rather than clamped to the
/// last row (which would silently fabricate a detection).
pub fn resolve_change_date(
    table: &TimeSeriesTable,
    trace: &PosteriorTrace,
    pooling: TauPooling,
) -> Result<ChangePointEstimate, AppError> {
    let tau_draws = match pooling {
        TauPooling::Chain0 => trace.tau_chain(0),
        TauPooling::Pooled => trace.tau_pooled(),
    };
    if tau_draws.is_empty() {
        return Err(AppError::inference("No tau draws available for resolution."));
    }

    let tau_mean = stats::mean(&tau_draws);
    let index = tau_mean.trunc() as usize;

    let date = table.date_at(index).ok_or_else(|| {
        AppError::inference(format!(
            "Resolved change index {index} (mean tau {tau_mean:.2}) is at/after the end of the \
             {}-row series — no in-sample change date.",
            table.len()
        ))
    })?;

    Ok(ChangePointEstimate {
        tau_mean,
        index,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic;
    use crate::sampler::{ChainTrace, PosteriorTrace};
    use chrono::NaiveDate;

    fn chain(tau: Vec<usize>) -> ChainTrace {
        let draws = tau.len();
        ChainTrace {
            tau,
            mu1: vec![0.0; draws],
            mu2: vec![1.0; draws],
            sigma: vec![0.1; draws],
            accept_rate: 0.9,
            step_size: 0.05,
        }
    }

    fn trace(chains: Vec<ChainTrace>) -> PosteriorTrace {
        let draws = chains[0].tau.len();
        PosteriorTrace {
            chains,
            draws,
            tune: 0,
            base_seed: 0,
        }
    }

    fn five_day_table() -> TimeSeriesTable {
        synthetic::table_from_returns(
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            &[0.0, 0.1, 0.2, 0.3, 0.4],
        )
    }

    #[test]
    fn summary_has_one_row_per_variable_in_order() {
        let t = trace(vec![chain(vec![2, 2, 3, 2]), chain(vec![2, 3, 3, 2])]);
        let summary = summarize(&t);
        let names: Vec<&str> = summary.rows.iter().map(|r| r.variable.display_name()).collect();
        assert_eq!(names, vec!["mu1", "mu2", "tau", "sigma"]);
        assert!(summary.row(Variable::Tau).unwrap().mean > 2.0);
    }

    #[test]
    fn chain0_and_pooled_resolution_differ_when_chains_disagree() {
        let table = five_day_table();
        // chain 0 centered on 1, chain 1 centered on 3
        let t = trace(vec![chain(vec![1, 1, 1, 1]), chain(vec![3, 3, 3, 3])]);

        let chain0 = resolve_change_date(&table, &t, TauPooling::Chain0).unwrap();
        assert_eq!(chain0.index, 1);

        let pooled = resolve_change_date(&table, &t, TauPooling::Pooled).unwrap();
        assert_eq!(pooled.index, 2);
        assert_eq!(
            pooled.date,
            NaiveDate::from_ymd_opt(2022, 3, 3).unwrap()
        );
    }

    #[test]
    fn resolution_truncates_toward_zero() {
        let table = five_day_table();
        // mean tau = 2.75 -> index 2
        let t = trace(vec![chain(vec![2, 3, 3, 3])]);
        let est = resolve_change_date(&table, &t, TauPooling::Chain0).unwrap();
        assert_eq!(est.index, 2);
        assert!((est.tau_mean - 2.75).abs() < 1e-12);
    }

    #[test]
    fn boundary_tau_at_n_fails_with_descriptive_error() {
        let table = five_day_table();
        // n = 5; every draw at the upper boundary forces index 5.
        let t = trace(vec![chain(vec![5, 5, 5, 5])]);
        let err = resolve_change_date(&table, &t, TauPooling::Chain0).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("no in-sample change date"));
    }

    #[test]
    fn in_range_resolution_always_yields_a_table_date() {
        let table = five_day_table();
        for target in 0..5usize {
            let t = trace(vec![chain(vec![target; 4])]);
            let est = resolve_change_date(&table, &t, TauPooling::Chain0).unwrap();
            assert_eq!(Some(est.date), table.date_at(target));
        }
    }
}
