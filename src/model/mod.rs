//! The single change-point model over a log-return series.
//!
//! Generative specification (for a series of length `n`):
//!
//! ```text
//! tau   ~ DiscreteUniform(0, n)          (inclusive of n)
//! mu1   ~ Normal(0, 1)
//! mu2   ~ Normal(0, 1)
//! sigma ~ HalfNormal(1)
//! y_i   ~ Normal(mu1 if i < tau else mu2, sigma)
//! ```
//!
//! The regime switch is a per-index comparison: `tau == 0` puts every point
//! in regime 2, `tau == n` puts every point in regime 1. There is no ordering
//! constraint between `mu1` and `mu2`, so label-switching across chains is a
//! known ambiguity of this model family (documented, not corrected).
//!
//! The model precomputes prefix sums of `y` and `y²` so the sampler can get
//! per-segment sufficient statistics in O(1) for any candidate `tau`.

use crate::error::AppError;

/// Standard deviation of the Normal(0, ·) priors on `mu1` / `mu2`.
pub const MU_PRIOR_SD: f64 = 1.0;

/// Scale of the HalfNormal prior on `sigma`.
pub const SIGMA_PRIOR_SCALE: f64 = 1.0;

const LN_2PI: f64 = 1.837_877_066_409_345_6;

/// Sufficient statistics for one regime segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSums {
    pub count: usize,
    pub sum: f64,
    pub sum_sq: f64,
}

/// The declared model, bound to the observed return series.
#[derive(Debug, Clone)]
pub struct ChangePointModel {
    returns: Vec<f64>,
    /// Prefix sums: `prefix_sum[t]` = sum of `returns[..t]` (length n+1).
    prefix_sum: Vec<f64>,
    prefix_sum_sq: Vec<f64>,
}

impl ChangePointModel {
    /// Bind the model to a return series.
    ///
    /// Fails if the series is empty (exit code 3) or contains non-finite
    /// values (exit code 4; ingest should have rejected these already).
    pub fn new(returns: Vec<f64>) -> Result<Self, AppError> {
        if returns.is_empty() {
            return Err(AppError::empty("Cannot build a model on an empty series."));
        }
        if let Some(bad) = returns.iter().position(|v| !v.is_finite()) {
            return Err(AppError::inference(format!(
                "Non-finite return at index {bad}; refusing to build the model."
            )));
        }

        let mut prefix_sum = Vec::with_capacity(returns.len() + 1);
        let mut prefix_sum_sq = Vec::with_capacity(returns.len() + 1);
        let (mut acc, mut acc_sq) = (0.0f64, 0.0f64);
        prefix_sum.push(0.0);
        prefix_sum_sq.push(0.0);
        for &y in &returns {
            acc += y;
            acc_sq += y * y;
            prefix_sum.push(acc);
            prefix_sum_sq.push(acc_sq);
        }

        Ok(Self {
            returns,
            prefix_sum,
            prefix_sum_sq,
        })
    }

    /// Series length `n`. The tau domain is `[0, n]` inclusive.
    pub fn n(&self) -> usize {
        self.returns.len()
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Regime classification: index `i` is in regime 1 iff `i < tau`.
    pub fn is_regime_one(index: usize, tau: usize) -> bool {
        index < tau
    }

    /// `(n1, n2)` — how many observations fall before/after the split.
    pub fn split_counts(&self, tau: usize) -> (usize, usize) {
        debug_assert!(tau <= self.n());
        (tau, self.n() - tau)
    }

    /// Sufficient statistics for the pre-split segment `returns[..tau]`.
    pub fn pre_sums(&self, tau: usize) -> SegmentSums {
        SegmentSums {
            count: tau,
            sum: self.prefix_sum[tau],
            sum_sq: self.prefix_sum_sq[tau],
        }
    }

    /// Sufficient statistics for the post-split segment `returns[tau..]`.
    pub fn post_sums(&self, tau: usize) -> SegmentSums {
        let n = self.n();
        SegmentSums {
            count: n - tau,
            sum: self.prefix_sum[n] - self.prefix_sum[tau],
            sum_sq: self.prefix_sum_sq[n] - self.prefix_sum_sq[tau],
        }
    }

    /// Full observation log-likelihood at the given parameters.
    pub fn log_likelihood(&self, tau: usize, mu1: f64, mu2: f64, sigma: f64) -> f64 {
        let n = self.n() as f64;
        let pre = self.pre_sums(tau);
        let post = self.post_sums(tau);
        let sse = segment_sse(&pre, mu1) + segment_sse(&post, mu2);
        -0.5 * n * LN_2PI - n * sigma.ln() - sse / (2.0 * sigma * sigma)
    }

    /// Joint log-prior. The DiscreteUniform prior on tau is flat over
    /// `[0, n]`, so it contributes only a constant and is dropped.
    pub fn log_prior(&self, mu1: f64, mu2: f64, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return f64::NEG_INFINITY;
        }
        normal_log_pdf(mu1, 0.0, MU_PRIOR_SD)
            + normal_log_pdf(mu2, 0.0, MU_PRIOR_SD)
            + half_normal_log_pdf(sigma, SIGMA_PRIOR_SCALE)
    }
}

/// `Σ (y_i - mu)²` over a segment, from its sufficient statistics.
pub fn segment_sse(sums: &SegmentSums, mu: f64) -> f64 {
    sums.sum_sq - 2.0 * mu * sums.sum + sums.count as f64 * mu * mu
}

pub fn normal_log_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    -0.5 * LN_2PI - sd.ln() - 0.5 * z * z
}

/// HalfNormal(scale) density for `x > 0` (twice the folded Normal).
pub fn half_normal_log_pdf(x: f64, scale: f64) -> f64 {
    if x <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let z = x / scale;
    (2.0f64).ln() - 0.5 * LN_2PI - scale.ln() - 0.5 * z * z
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(values: &[f64]) -> ChangePointModel {
        ChangePointModel::new(values.to_vec()).unwrap()
    }

    #[test]
    fn rejects_empty_and_non_finite_series() {
        assert_eq!(ChangePointModel::new(vec![]).unwrap_err().exit_code(), 3);
        assert_eq!(
            ChangePointModel::new(vec![0.1, f64::NAN]).unwrap_err().exit_code(),
            4
        );
    }

    #[test]
    fn regime_split_matches_index_comparison() {
        let m = model(&[0.1, 0.2, 0.3, 0.4, 0.5]);
        let n = m.n();
        for tau in 0..=n {
            for i in 0..n {
                assert_eq!(ChangePointModel::is_regime_one(i, tau), i < tau);
            }
            let (n1, n2) = m.split_counts(tau);
            assert_eq!(n1, tau);
            assert_eq!(n1 + n2, n);
        }
        // Boundary cases produce valid empty segments.
        assert_eq!(m.pre_sums(0).count, 0);
        assert_eq!(m.post_sums(n).count, 0);
    }

    #[test]
    fn segment_sums_match_naive_computation() {
        let values = [0.3, -0.1, 0.7, 0.05];
        let m = model(&values);
        for tau in 0..=values.len() {
            let pre = m.pre_sums(tau);
            let naive_sum: f64 = values[..tau].iter().sum();
            let naive_sq: f64 = values[..tau].iter().map(|v| v * v).sum();
            assert!((pre.sum - naive_sum).abs() < 1e-12);
            assert!((pre.sum_sq - naive_sq).abs() < 1e-12);

            let post = m.post_sums(tau);
            let naive_post: f64 = values[tau..].iter().sum();
            assert!((post.sum - naive_post).abs() < 1e-12);
        }
    }

    #[test]
    fn log_likelihood_matches_pointwise_sum() {
        let values = [0.2, -0.4, 0.1];
        let m = model(&values);
        let (tau, mu1, mu2, sigma) = (1usize, 0.1, -0.2, 0.5);

        let naive: f64 = values
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let mu = if i < tau { mu1 } else { mu2 };
                normal_log_pdf(y, mu, sigma)
            })
            .sum();

        let fast = m.log_likelihood(tau, mu1, mu2, sigma);
        assert!((fast - naive).abs() < 1e-10);
    }

    #[test]
    fn half_normal_prior_rejects_non_positive_sigma() {
        let m = model(&[0.1]);
        assert_eq!(m.log_prior(0.0, 0.0, 0.0), f64::NEG_INFINITY);
        assert!(m.log_prior(0.0, 0.0, 1.0).is_finite());
    }
}
