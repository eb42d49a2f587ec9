//! Posterior sampling orchestration.
//!
//! Responsibilities:
//!
//! - validate sampler settings
//! - derive per-chain seeds from one base seed
//! - run independent chains in parallel (rayon)
//! - assemble the immutable `PosteriorTrace`
//!
//! The single-chain kernel lives in `gibbs`.

use rayon::prelude::*;

use crate::error::AppError;
use crate::model::ChangePointModel;

pub mod gibbs;

pub use gibbs::ChainTrace;

/// Sampler settings (defaults match the analysis: 2000/1000/0.95, 4 chains).
#[derive(Debug, Clone)]
pub struct SamplerSettings {
    /// Post-warm-up draws retained per chain.
    pub draws: usize,
    /// Warm-up iterations discarded per chain.
    pub tune: usize,
    /// Target acceptance rate for sigma step-size adaptation.
    pub target_accept: f64,
    pub chains: usize,
    /// Base seed; `None` draws one from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            draws: 2000,
            tune: 1000,
            target_accept: 0.95,
            chains: 4,
            seed: None,
        }
    }
}

/// Per-chain, per-draw posterior samples for every latent variable.
///
/// Produced once by `sample` and immutable thereafter.
#[derive(Debug, Clone)]
pub struct PosteriorTrace {
    pub chains: Vec<ChainTrace>,
    pub draws: usize,
    pub tune: usize,
    /// The base seed actually used (recorded so runs can be replayed).
    pub base_seed: u64,
}

impl PosteriorTrace {
    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    /// Tau draws from one chain, as f64 (for means/summary statistics).
    pub fn tau_chain(&self, chain: usize) -> Vec<f64> {
        self.chains[chain].tau.iter().map(|&t| t as f64).collect()
    }

    /// Tau draws pooled across all chains, as f64.
    pub fn tau_pooled(&self) -> Vec<f64> {
        self.chains
            .iter()
            .flat_map(|c| c.tau.iter().map(|&t| t as f64))
            .collect()
    }

    pub fn mu1_pooled(&self) -> Vec<f64> {
        self.chains.iter().flat_map(|c| c.mu1.iter().copied()).collect()
    }

    pub fn mu2_pooled(&self) -> Vec<f64> {
        self.chains.iter().flat_map(|c| c.mu2.iter().copied()).collect()
    }

    pub fn sigma_pooled(&self) -> Vec<f64> {
        self.chains.iter().flat_map(|c| c.sigma.iter().copied()).collect()
    }
}

/// Draw posterior samples from the change-point model.
///
/// One opaque blocking call from the pipeline's perspective: all chains run
/// to completion (in parallel) before anything is returned. No partial
/// results, streaming, or cancellation path is exposed.
pub fn sample(model: &ChangePointModel, settings: &SamplerSettings) -> Result<PosteriorTrace, AppError> {
    validate(settings)?;

    let base_seed = settings.seed.unwrap_or_else(rand::random::<u64>);

    let chains: Vec<ChainTrace> = (0..settings.chains)
        .into_par_iter()
        .map(|chain| gibbs::run_chain(model, settings, chain_seed(base_seed, chain)))
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(PosteriorTrace {
        chains,
        draws: settings.draws,
        tune: settings.tune,
        base_seed,
    })
}

fn validate(settings: &SamplerSettings) -> Result<(), AppError> {
    if settings.draws == 0 {
        return Err(AppError::inference("Sampler draws must be > 0."));
    }
    if settings.chains == 0 {
        return Err(AppError::inference("Sampler chains must be > 0."));
    }
    if !(settings.target_accept > 0.0 && settings.target_accept < 1.0) {
        return Err(AppError::inference(
            "Target acceptance rate must lie strictly between 0 and 1.",
        ));
    }
    Ok(())
}

/// Derive a per-chain seed. Chains must be decorrelated but reproducible
/// from the single base seed, so we mix the chain index through a
/// SplitMix64-style multiplier rather than adding small offsets.
fn chain_seed(base_seed: u64, chain: usize) -> u64 {
    base_seed ^ (chain as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
