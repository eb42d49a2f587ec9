//! Single-chain kernel: Gibbs-within-Metropolis for the change-point model.
//!
//! Update scheme per iteration:
//!
//! 1. `tau | mu1, mu2, sigma` — exact draw from the discrete full
//!    conditional over `[0, n]`. Segment sums come from the model's prefix
//!    sums, so the whole conditional costs O(n) per iteration.
//! 2. `mu1 | tau, sigma` and `mu2 | tau, sigma` — exact conjugate Normal
//!    draws (Normal prior, known-sigma Normal likelihood). An empty regime
//!    falls back to the prior.
//! 3. `sigma | tau, mu1, mu2` — random-walk Metropolis on `log(sigma)`
//!    (the HalfNormal prior is not conjugate). The proposal step size is
//!    adapted toward the target acceptance rate during warm-up only, via a
//!    decaying Robbins–Monro update, then frozen for the retained draws.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;
use crate::model::{self, ChangePointModel, SegmentSums, segment_sse};
use crate::sampler::SamplerSettings;

/// Bounds keeping `sigma` away from degenerate values.
const SIGMA_MIN: f64 = 1e-8;
const SIGMA_MAX: f64 = 1e8;

/// Initial random-walk step size on the log-sigma scale.
const INITIAL_STEP: f64 = 0.1;

/// Retained draws and adaptation diagnostics for one chain.
#[derive(Debug, Clone)]
pub struct ChainTrace {
    pub tau: Vec<usize>,
    pub mu1: Vec<f64>,
    pub mu2: Vec<f64>,
    pub sigma: Vec<f64>,
    /// Acceptance rate of the sigma step over the retained draws.
    pub accept_rate: f64,
    /// Step size after warm-up adaptation.
    pub step_size: f64,
}

struct ChainState {
    tau: usize,
    mu1: f64,
    mu2: f64,
    sigma: f64,
}

/// Run one chain: `tune` warm-up iterations (discarded), then `draws`
/// retained iterations.
pub fn run_chain(
    model: &ChangePointModel,
    settings: &SamplerSettings,
    seed: u64,
) -> Result<ChainTrace, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let std_normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::inference(format!("Proposal distribution error: {e}")))?;

    let n = model.n();
    let mut state = initial_state(model);
    let mut log_weights = vec![0.0f64; n + 1];

    let mut log_step = INITIAL_STEP.ln();
    let mut retained_accepts = 0usize;

    let total = settings.tune + settings.draws;
    let mut tau_draws = Vec::with_capacity(settings.draws);
    let mut mu1_draws = Vec::with_capacity(settings.draws);
    let mut mu2_draws = Vec::with_capacity(settings.draws);
    let mut sigma_draws = Vec::with_capacity(settings.draws);

    for t in 0..total {
        state.tau = sample_tau(model, &state, &mut log_weights, &mut rng)?;
        state.mu1 = sample_regime_mean(model.pre_sums(state.tau), state.sigma, &mut rng, &std_normal);
        state.mu2 = sample_regime_mean(model.post_sums(state.tau), state.sigma, &mut rng, &std_normal);

        let tuning = t < settings.tune;
        let accepted = sigma_step(
            model,
            &mut state,
            &mut log_step,
            tuning.then_some(adapt_gain(t)),
            settings.target_accept,
            &mut rng,
            &std_normal,
        )?;

        if !tuning {
            if accepted {
                retained_accepts += 1;
            }
            tau_draws.push(state.tau);
            mu1_draws.push(state.mu1);
            mu2_draws.push(state.mu2);
            sigma_draws.push(state.sigma);
        }
    }

    Ok(ChainTrace {
        tau: tau_draws,
        mu1: mu1_draws,
        mu2: mu2_draws,
        sigma: sigma_draws,
        accept_rate: retained_accepts as f64 / settings.draws as f64,
        step_size: log_step.exp(),
    })
}

/// Start from data-driven values so warm-up spends its budget on adaptation
/// rather than on escaping an arbitrary corner of the space.
fn initial_state(model: &ChangePointModel) -> ChainState {
    let n = model.n();
    let all = model.pre_sums(n);
    let mean = all.sum / n as f64;
    let var = (all.sum_sq / n as f64 - mean * mean).max(0.0);

    ChainState {
        tau: n / 2,
        mu1: mean,
        mu2: mean,
        sigma: var.sqrt().max(1e-3),
    }
}

/// Exact draw from `tau | mu1, mu2, sigma` over the closed domain `[0, n]`.
///
/// The flat DiscreteUniform prior and all tau-independent likelihood terms
/// cancel in the normalization, leaving only the two segment SSE terms.
fn sample_tau(
    model: &ChangePointModel,
    state: &ChainState,
    log_weights: &mut [f64],
    rng: &mut StdRng,
) -> Result<usize, AppError> {
    let inv_two_var = 1.0 / (2.0 * state.sigma * state.sigma);

    let mut max_lw = f64::NEG_INFINITY;
    for (tau, lw) in log_weights.iter_mut().enumerate() {
        let sse = segment_sse(&model.pre_sums(tau), state.mu1)
            + segment_sse(&model.post_sums(tau), state.mu2);
        *lw = -sse * inv_two_var;
        if *lw > max_lw {
            max_lw = *lw;
        }
    }
    if !max_lw.is_finite() {
        return Err(AppError::inference(
            "Non-finite tau conditional; the likelihood is numerically degenerate.",
        ));
    }

    // Log-sum-exp normalization, then inverse-CDF categorical draw.
    let total: f64 = log_weights.iter().map(|&lw| (lw - max_lw).exp()).sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(AppError::inference(
            "Tau conditional weights underflowed to zero.",
        ));
    }

    let u = rng.gen_range(0.0..1.0) * total;
    let mut acc = 0.0;
    for (tau, &lw) in log_weights.iter().enumerate() {
        acc += (lw - max_lw).exp();
        if u < acc {
            return Ok(tau);
        }
    }
    // Floating-point slack: u landed at the very top of the CDF.
    Ok(log_weights.len() - 1)
}

/// Conjugate draw for a regime mean given its segment statistics.
///
/// Prior Normal(0, MU_PRIOR_SD), likelihood Normal(mu, sigma) over `count`
/// observations. With `count == 0` this collapses to the prior, which is
/// exactly what the boundary cases `tau == 0` / `tau == n` require.
fn sample_regime_mean(
    sums: SegmentSums,
    sigma: f64,
    rng: &mut StdRng,
    std_normal: &Normal<f64>,
) -> f64 {
    let prior_precision = 1.0 / (model::MU_PRIOR_SD * model::MU_PRIOR_SD);
    let data_precision = sums.count as f64 / (sigma * sigma);
    let posterior_precision = prior_precision + data_precision;

    let posterior_mean = (sums.sum / (sigma * sigma)) / posterior_precision;
    let posterior_sd = posterior_precision.sqrt().recip();

    posterior_mean + posterior_sd * std_normal.sample(rng)
}

/// One Metropolis step on `log(sigma)`; returns whether it was accepted.
///
/// `adapt` carries the Robbins–Monro gain while tuning and is `None` once
/// the step size is frozen.
fn sigma_step(
    model: &ChangePointModel,
    state: &mut ChainState,
    log_step: &mut f64,
    adapt: Option<f64>,
    target_accept: f64,
    rng: &mut StdRng,
    std_normal: &Normal<f64>,
) -> Result<bool, AppError> {
    let current_log_sigma = state.sigma.ln();
    let current = sigma_log_posterior(model, state, state.sigma);
    if !current.is_finite() {
        return Err(AppError::inference(
            "Non-finite posterior density at the current sigma; sampling cannot continue.",
        ));
    }

    let proposal_log_sigma = current_log_sigma + log_step.exp() * std_normal.sample(rng);
    let proposal_sigma = proposal_log_sigma.exp().clamp(SIGMA_MIN, SIGMA_MAX);
    let proposed = sigma_log_posterior(model, state, proposal_sigma);

    // Log-scale proposal needs the Jacobian term log|dsigma/dtheta| = theta.
    let log_alpha = (proposed + proposal_sigma.ln()) - (current + current_log_sigma);
    let accept_prob = log_alpha.min(0.0).exp();

    let accepted = rng.gen_range(0.0..1.0) < accept_prob;
    if accepted {
        state.sigma = proposal_sigma;
    }

    if let Some(gain) = adapt {
        *log_step += gain * (accept_prob - target_accept);
    }

    Ok(accepted)
}

/// Unnormalized log-posterior of sigma given everything else.
fn sigma_log_posterior(model: &ChangePointModel, state: &ChainState, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return f64::NEG_INFINITY;
    }
    model.log_likelihood(state.tau, state.mu1, state.mu2, sigma)
        + model::half_normal_log_pdf(sigma, model::SIGMA_PRIOR_SCALE)
}

/// Decaying adaptation gain; large early corrections, vanishing by the end
/// of a 1000-iteration warm-up.
fn adapt_gain(t: usize) -> f64 {
    (t as f64 + 1.0).powf(-0.6)
}
