//! Posterior summary statistics.
//!
//! Small, dependency-free primitives shared by the reporter and the plots:
//!
//! - mean / standard deviation
//! - highest-density interval (94%, the convention the summary table uses)
//! - autocorrelation-based effective sample size
//! - split-chain potential scale reduction factor (R-hat)
//! - histogram binning

/// Probability mass covered by the reported highest-density interval.
pub const HDI_PROB: f64 = 0.94;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (unbiased; NaN for fewer than two values).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Highest-density interval: the shortest contiguous window of sorted draws
/// covering `prob` of the mass.
pub fn hdi(values: &[f64], prob: f64) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let window = ((prob * n as f64).ceil() as usize).clamp(1, n);
    if window == n {
        return (sorted[0], sorted[n - 1]);
    }

    let mut best_start = 0;
    let mut best_width = f64::INFINITY;
    for start in 0..=(n - window) {
        let width = sorted[start + window - 1] - sorted[start];
        if width < best_width {
            best_width = width;
            best_start = start;
        }
    }
    (sorted[best_start], sorted[best_start + window - 1])
}

/// Effective sample size of a single chain.
///
/// Uses the initial-positive-sequence truncation: sum lag autocorrelations
/// until they drop below a small threshold, then `n / (1 + 2 Σ rho)`.
pub fn ess(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 2 {
        return n as f64;
    }

    let m = mean(chain);
    let var = chain.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / n as f64;
    if var < 1e-12 {
        return n as f64; // constant chain; treat as independent
    }

    let mut sum_rho = 0.0;
    for k in 1..=(n / 2).min(200) {
        let rho = autocorrelation(chain, k, m, var);
        if rho < 0.05 {
            break;
        }
        sum_rho += rho;
    }

    n as f64 / (1.0 + 2.0 * sum_rho)
}

/// ESS summed over chains (each chain contributes independently).
pub fn ess_multi(chains: &[Vec<f64>]) -> f64 {
    chains.iter().map(|c| ess(c)).sum()
}

/// Lag-k autocorrelation.
fn autocorrelation(chain: &[f64], k: usize, mean: f64, var: f64) -> f64 {
    let n = chain.len();
    if k >= n {
        return 0.0;
    }
    let cov = (0..(n - k))
        .map(|i| (chain[i] - mean) * (chain[i + k] - mean))
        .sum::<f64>()
        / (n - k) as f64;
    cov / var
}

/// Split-chain potential scale reduction factor (R-hat).
///
/// Each chain is split in half, then the classic between/within variance
/// ratio is computed over the half-chains. Values near 1.0 indicate the
/// chains agree; > 1.01 is the usual "look closer" threshold.
pub fn split_r_hat(chains: &[Vec<f64>]) -> f64 {
    let mut halves: Vec<&[f64]> = Vec::with_capacity(chains.len() * 2);
    for chain in chains {
        let half = chain.len() / 2;
        if half < 2 {
            return f64::NAN;
        }
        halves.push(&chain[..half]);
        halves.push(&chain[half..half * 2]);
    }

    let m = halves.len() as f64;
    let len = halves[0].len() as f64;

    let means: Vec<f64> = halves.iter().map(|h| mean(h)).collect();
    let grand_mean = mean(&means);

    let between = len / (m - 1.0)
        * means
            .iter()
            .map(|mu| (mu - grand_mean) * (mu - grand_mean))
            .sum::<f64>();
    let within = halves
        .iter()
        .map(|h| {
            let sd = std_dev(h);
            sd * sd
        })
        .sum::<f64>()
        / m;

    if within < 1e-12 {
        // Degenerate (constant) chains: identical constants are converged.
        return if between < 1e-12 { 1.0 } else { f64::INFINITY };
    }

    let var_plus = (len - 1.0) / len * within + between / len;
    (var_plus / within).sqrt()
}

/// One histogram bin: left edge, right edge, count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub left: f64,
    pub right: f64,
    pub count: usize,
}

/// Fixed-width histogram over `[min, max]`; the top edge is inclusive so the
/// maximum value lands in the last bin.
pub fn histogram(values: &[f64], min: f64, max: f64, bins: usize) -> Vec<Bin> {
    assert!(bins > 0, "histogram needs at least one bin");
    let span = (max - min).max(f64::MIN_POSITIVE);
    let width = span / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        if v < min || v > max {
            continue;
        }
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            left: min + width * i as f64,
            right: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}
