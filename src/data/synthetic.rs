//! Seeded synthetic return series with a known mean shift.
//!
//! Used by the statistical scenario tests: generate a series whose change
//! point is known by construction, run the full sampler, and check that the
//! posterior recovers it within sampling noise.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Observation, TimeSeriesTable};
use crate::error::AppError;

/// Generate `n1 + n2` returns: `n1` draws from Normal(`mu1`, `sigma`)
/// followed by `n2` draws from Normal(`mu2`, `sigma`). The true change
/// index is `n1`.
pub fn shifted_series(
    n1: usize,
    n2: usize,
    mu1: f64,
    mu2: f64,
    sigma: f64,
    seed: u64,
) -> Result<Vec<f64>, AppError> {
    if n1 + n2 == 0 {
        return Err(AppError::empty("Synthetic series length must be > 0."));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(AppError::inference("Synthetic noise scale must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma)
        .map_err(|e| AppError::inference(format!("Noise distribution error: {e}")))?;

    let mut out = Vec::with_capacity(n1 + n2);
    for i in 0..(n1 + n2) {
        let mu = if i < n1 { mu1 } else { mu2 };
        out.push(mu + noise.sample(&mut rng));
    }
    Ok(out)
}

/// Wrap raw returns in a table with consecutive calendar dates starting at
/// `start`. Calendar (not trading) days keep the fixture trivial; nothing in
/// the pipeline depends on date spacing.
pub fn table_from_returns(start: NaiveDate, returns: &[f64]) -> TimeSeriesTable {
    let rows = returns
        .iter()
        .enumerate()
        .map(|(i, &log_return)| Observation {
            date: start + Duration::days(i as i64),
            log_return,
        })
        .collect();
    TimeSeriesTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_series_has_the_requested_shape() {
        let series = shifted_series(50, 50, 0.0, 1.0, 0.1, 42).unwrap();
        assert_eq!(series.len(), 100);

        let pre_mean: f64 = series[..50].iter().sum::<f64>() / 50.0;
        let post_mean: f64 = series[50..].iter().sum::<f64>() / 50.0;
        assert!(pre_mean.abs() < 0.1, "pre-shift mean {pre_mean}");
        assert!((post_mean - 1.0).abs() < 0.1, "post-shift mean {post_mean}");
    }

    #[test]
    fn shifted_series_is_seed_deterministic() {
        let a = shifted_series(10, 10, 0.0, 0.5, 0.2, 7).unwrap();
        let b = shifted_series(10, 10, 0.0, 0.5, 0.2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn table_dates_are_consecutive() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let table = table_from_returns(start, &[0.1, 0.2, 0.3]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.date_at(2).unwrap(), start + Duration::days(2));
    }

    #[test]
    fn zero_length_series_is_rejected() {
        assert_eq!(shifted_series(0, 0, 0.0, 1.0, 0.1, 1).unwrap_err().exit_code(), 3);
    }
}
