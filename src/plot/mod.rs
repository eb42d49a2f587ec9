//! Diagnostic figures rendered to PNG via plotters.
//!
//! Two figures are produced per run:
//!
//! - the trace plot: one row per latent variable, marginal histogram on the
//!   left, per-chain sample path on the right
//! - the posterior comparison: overlapping histograms of the pooled `mu1`
//!   and `mu2` draws, with a vertical marker at each mean
//!
//! The figures are deliberately text-free: plotters' font rendering drags in
//! native dependencies (fontconfig via font-kit), and the panel layout is
//! fixed, so the variable order (mu1, mu2, tau, sigma — top to bottom) is
//! documented here instead of drawn as captions.
//!
//! All statistics come from `stats`; this module is presentation only.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::Variable;
use crate::error::AppError;
use crate::sampler::PosteriorTrace;
use crate::stats;

const TRACE_PLOT_SIZE: (u32, u32) = (1280, 960);
const COMPARISON_PLOT_SIZE: (u32, u32) = (1000, 600);
const MARGINAL_BINS: usize = 40;
const COMPARISON_BINS: usize = 50;

const MU1_COLOR: RGBColor = RGBColor(100, 160, 210);
const MU2_COLOR: RGBColor = RGBColor(235, 140, 50);

/// Render the per-variable trace/marginal diagnostic figure.
///
/// Rows top to bottom follow `Variable::ALL`: mu1, mu2, tau, sigma.
/// Left column: marginal frequency polygon per chain. Right column: sample
/// path per chain.
pub fn render_trace_plot(path: &Path, trace: &PosteriorTrace) -> Result<(), AppError> {
    let root = BitMapBackend::new(path, TRACE_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let panels = root.split_evenly((Variable::ALL.len(), 2));
    for (row, &variable) in Variable::ALL.iter().enumerate() {
        let chains = chain_samples(trace, variable);
        draw_marginal_panel(&panels[row * 2], &chains)?;
        draw_trace_panel(&panels[row * 2 + 1], &chains)?;
    }

    root.present().map_err(draw_err)
}

/// Render the overlapping mu1/mu2 posterior histogram figure.
///
/// mu1 is the blue-ish series, mu2 the orange one; the vertical line through
/// each histogram marks that variable's pooled posterior mean.
pub fn render_posterior_comparison(path: &Path, trace: &PosteriorTrace) -> Result<(), AppError> {
    let mu1 = trace.mu1_pooled();
    let mu2 = trace.mu2_pooled();

    let (min, max) = padded_range(mu1.iter().chain(mu2.iter()).copied());
    let bins1 = stats::histogram(&mu1, min, max, COMPARISON_BINS);
    let bins2 = stats::histogram(&mu2, min, max, COMPARISON_BINS);
    let y_max = bins1
        .iter()
        .chain(bins2.iter())
        .map(|b| b.count)
        .max()
        .unwrap_or(1) as f64
        * 1.05;

    let root = BitMapBackend::new(path, COMPARISON_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .build_cartesian_2d(min..max, 0.0..y_max)
        .map_err(draw_err)?;

    chart.configure_mesh().draw().map_err(draw_err)?;

    for (bins, color) in [(&bins1, MU1_COLOR), (&bins2, MU2_COLOR)] {
        chart
            .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
                Rectangle::new(
                    [(b.left, 0.0), (b.right, b.count as f64)],
                    color.mix(0.5).filled(),
                )
            }))
            .map_err(draw_err)?;
    }

    for (samples, color) in [(&mu1, MU1_COLOR), (&mu2, MU2_COLOR)] {
        let mean = stats::mean(samples);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(mean, 0.0), (mean, y_max)],
                color.stroke_width(2),
            )))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)
}

fn chain_samples(trace: &PosteriorTrace, variable: Variable) -> Vec<Vec<f64>> {
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

fn draw_marginal_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chains: &[Vec<f64>],
) -> Result<(), AppError> {
    let (min, max) = padded_range(chains.iter().flatten().copied());
    let mut y_max = 1.0f64;
    let histograms: Vec<Vec<stats::Bin>> = chains
        .iter()
        .map(|samples| {
            let bins = stats::histogram(samples, min, max, MARGINAL_BINS);
            y_max = y_max.max(bins.iter().map(|b| b.count).max().unwrap_or(0) as f64);
            bins
        })
        .collect();

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_2d(min..max, 0.0..y_max * 1.05)
        .map_err(draw_err)?;

    chart.configure_mesh().draw().map_err(draw_err)?;

    for (idx, bins) in histograms.iter().enumerate() {
        // Frequency polygon per chain; overlapping chains stay readable where
        // filled bars would not.
        let series = bins
            .iter()
            .map(|b| ((b.left + b.right) / 2.0, b.count as f64));
        chart
            .draw_series(LineSeries::new(series, Palette99::pick(idx).stroke_width(1)))
            .map_err(draw_err)?;
    }

    Ok(())
}

fn draw_trace_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chains: &[Vec<f64>],
) -> Result<(), AppError> {
    let (min, max) = padded_range(chains.iter().flatten().copied());
    let draws = chains.iter().map(|c| c.len()).max().unwrap_or(1);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_2d(0.0..draws as f64, min..max)
        .map_err(draw_err)?;

    chart.configure_mesh().draw().map_err(draw_err)?;

    for (idx, samples) in chains.iter().enumerate() {
        let series = samples.iter().enumerate().map(|(i, &v)| (i as f64, v));
        chart
            .draw_series(LineSeries::new(series, Palette99::pick(idx).stroke_width(1)))
            .map_err(draw_err)?;
    }

    Ok(())
}

/// Axis range with 5% padding; degenerate (constant) samples get a fixed
/// half-unit pad so the chart still has area.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        return (min - 0.5, max + 0.5);
    }
    (min - span * 0.05, max + span * 0.05)
}

fn draw_err<E: std::error::Error>(e: E) -> AppError {
    AppError::output(format!("Failed to render figure: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::ChainTrace;

    fn small_trace() -> PosteriorTrace {
        let chain = |offset: f64| ChainTrace {
            tau: vec![2, 3, 3, 2, 3],
            mu1: vec![0.1 + offset, 0.2, 0.15, 0.12, 0.18],
            mu2: vec![1.1, 1.0 + offset, 1.05, 0.95, 1.02],
            sigma: vec![0.5, 0.45, 0.52, 0.48, 0.5],
            accept_rate: 0.9,
            step_size: 0.05,
        };
        PosteriorTrace {
            chains: vec![chain(0.0), chain(0.01)],
            draws: 5,
            tune: 0,
            base_seed: 1,
        }
    }

    #[test]
    fn renders_both_figures_to_disk() {
        let dir = std::env::temp_dir().join(format!("brentcp-plot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let trace = small_trace();

        let trace_path = dir.join("trace.png");
        render_trace_plot(&trace_path, &trace).unwrap();
        assert!(trace_path.metadata().unwrap().len() > 0);

        let cmp_path = dir.join("cmp.png");
        render_posterior_comparison(&cmp_path, &trace).unwrap();
        assert!(cmp_path.metadata().unwrap().len() > 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn padded_range_adds_margin() {
        let (min, max) = padded_range([1.0, 2.0, 3.0].into_iter());
        assert!(min < 1.0 && min > 0.8);
        assert!(max > 3.0 && max < 3.2);
    }

    #[test]
    fn padded_range_handles_constant_and_empty_input() {
        let (min, max) = padded_range([2.0, 2.0].into_iter());
        assert!((min - 1.5).abs() < 1e-12 && (max - 2.5).abs() < 1e-12);

        let (min, max) = padded_range(std::iter::empty());
        assert_eq!((min, max), (0.0, 1.0));
    }
}
