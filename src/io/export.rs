//! Export the posterior summary to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts; one row per latent variable, fixed column order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::SummaryTable;
use crate::error::AppError;

/// Write the summary table to a CSV file (overwrites silently).
pub fn write_summary_csv(path: &Path, summary: &SummaryTable) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::output(format!(
            "Failed to create summary CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "variable,mean,sd,hdi_3%,hdi_97%,ess,r_hat")
        .map_err(|e| AppError::output(format!("Failed to write summary CSV header: {e}")))?;

    for row in &summary.rows {
        writeln!(
            file,
            "{},{:.6},{:.6},{:.6},{:.6},{:.1},{:.4}",
            row.variable.display_name(),
            row.mean,
            row.sd,
            row.hdi_low,
            row.hdi_high,
            row.ess,
            row.r_hat,
        )
        .map_err(|e| AppError::output(format!("Failed to write summary CSV row: {e}")))?;
    }

    Ok(())
}
