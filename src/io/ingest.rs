//! CSV ingest and cleaning.
//!
//! This module turns a raw log-returns CSV into a `TimeSeriesTable` that is
//! safe to hand to the model.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level cleaning**: a row with any missing field is dropped, but we
//!   report what happened instead of failing the run
//! - **Order preservation**: rows come out in file order, never re-sorted
//! - **No inference logic here**: this module only loads and validates

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Observation, TimeSeriesTable};
use crate::error::AppError;

/// A row-level problem encountered (and survived) during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based CSV line number (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: the cleaned table plus bookkeeping for the run report.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub table: TimeSeriesTable,
    /// The extracted log-return column (same order/length as `table`).
    pub returns: Vec<f64>,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

/// Load and clean a log-returns CSV.
///
/// Required columns (case-insensitive): `date`, `log_return`. Extra columns
/// are ignored for values, but an empty field in *any* column drops the row
/// (matching the source analysis, which dropped rows with missing values
/// across the whole frame).
pub fn load_time_series(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let n_columns = headers.len();

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| AppError::input("Missing required column: `date`"))?;
    let return_idx = *header_map
        .get("log_return")
        .ok_or_else(|| AppError::input("Missing required column: `log_return`"))?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, date_idx, return_idx, n_columns) {
            Ok(obs) => rows.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = rows.len();
    if rows_used == 0 {
        return Err(AppError::empty(
            "No valid rows remain after dropping incomplete/unparseable rows.",
        ));
    }

    let table = TimeSeriesTable { rows };
    let returns = table.returns();

    Ok(IngestedSeries {
        table,
        returns,
        rows_read,
        rows_used,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    return_idx: usize,
    n_columns: usize,
) -> Result<Observation, String> {
    // dropna semantics: any missing field in the row (even in a column the
    // model never looks at) drops the row.
    for col in 0..n_columns {
        match record.get(col) {
            Some(v) if !v.trim().is_empty() => {}
            _ => return Err(format!("Missing value in column {}.", col + 1)),
        }
    }

    let date_raw = record
        .get(date_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing `date` value.".to_string())?;
    let date = parse_date(date_raw)?;

    let return_raw = record
        .get(return_idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing `log_return` value.".to_string())?;
    let log_return: f64 = return_raw
        .parse()
        .map_err(|_| format!("Invalid `log_return` '{return_raw}' (not a number)."))?;
    if !log_return.is_finite() {
        return Err(format!("Non-finite `log_return` '{return_raw}'."));
    }

    Ok(Observation { date, log_return })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are the recommendation, but price-history exports often use
    // `DD/MM/YYYY` or `DD-MM-YYYY`. We accept a small set of common formats
    // to reduce friction while keeping parsing deterministic.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}
