//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the summary/resolution code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{ChangePointEstimate, SummaryTable, TauPooling};
use crate::io::ingest::IngestedSeries;
use crate::sampler::PosteriorTrace;

/// Format the run header: dataset + sampler diagnostics.
pub fn format_run_summary(ingest: &IngestedSeries, trace: &PosteriorTrace) -> String {
    let mut out = String::new();

    out.push_str("=== brentcp - Bayesian change-point detection ===\n");
    out.push_str(&format!(
        "Rows: read={} used={} dropped={}\n",
        ingest.rows_read,
        ingest.rows_used,
        ingest.rows_read - ingest.rows_used,
    ));
    for e in ingest.row_errors.iter().take(5) {
        out.push_str(&format!("  (line {}) {}\n", e.line, e.message));
    }
    if ingest.row_errors.len() > 5 {
        out.push_str(&format!(
            "  ... and {} more dropped rows\n",
            ingest.row_errors.len() - 5
        ));
    }

    out.push_str(&format!(
        "Sampler: chains={} draws={} tune={} seed={}\n",
        trace.n_chains(),
        trace.draws,
        trace.tune,
        trace.base_seed,
    ));
    for (idx, chain) in trace.chains.iter().enumerate() {
        out.push_str(&format!(
            "  chain {idx}: sigma accept={:.2} step={:.4}\n",
            chain.accept_rate, chain.step_size,
        ));
    }

    out
}

/// Format the resolved change date line.
pub fn format_change_date(estimate: &ChangePointEstimate, pooling: TauPooling) -> String {
    let pooling_note = match pooling {
        TauPooling::Chain0 => "chain 0",
        TauPooling::Pooled => "all chains",
    };
    format!(
        "Most probable change point date: {} (index {}, mean tau {:.2}, {pooling_note})",
        estimate.date, estimate.index, estimate.tau_mean,
    )
}

/// Format the posterior summary table.
pub fn format_summary_table(summary: &SummaryTable) -> String {
    let mut out = String::new();

    out.push_str(
        format!(
            "{:<8} {:>12} {:>12} {:>12} {:>12} {:>10} {:>8}\n",
            "variable", "mean", "sd", "hdi_3%", "hdi_97%", "ess", "r_hat"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<8} {:-<12} {:-<12} {:-<12} {:-<12} {:-<10} {:-<8}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in &summary.rows {
        out.push_str(
            format!(
                "{:<8} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>10.0} {:>8.3}\n",
                row.variable.display_name(),
                row.mean,
                row.sd,
                row.hdi_low,
                row.hdi_high,
                row.ess,
                row.r_hat,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParamSummary, Variable};
    use chrono::NaiveDate;

    #[test]
    fn summary_table_lists_every_variable_once() {
        let summary = SummaryTable {
            rows: Variable::ALL
                .iter()
                .map(|&variable| ParamSummary {
                    variable,
                    mean: 0.5,
                    sd: 0.1,
                    hdi_low: 0.3,
                    hdi_high: 0.7,
                    ess: 1500.0,
                    r_hat: 1.001,
                })
                .collect(),
        };

        let text = format_summary_table(&summary);
        for name in ["mu1", "mu2", "tau", "sigma"] {
            assert_eq!(text.matches(&format!("\n{name} ")).count(), 1, "{name}");
        }
    }

    #[test]
    fn change_date_line_prints_date_only() {
        let estimate = ChangePointEstimate {
            tau_mean: 101.4,
            index: 101,
            date: NaiveDate::from_ymd_opt(2022, 3, 7).unwrap(),
        };
        let line = format_change_date(&estimate, TauPooling::Chain0);
        assert!(line.contains("2022-03-07"));
        assert!(!line.contains("00:00"));
    }
}
