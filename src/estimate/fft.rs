//! Frequency-domain thickness estimate.
//!
//! The reflected intensity of a film of thickness `h` is periodic in
//! `x = n(λ)/λ` with period `1/(2h)`. After resampling onto a uniform `x`
//! grid, the dominant Fourier frequency is the optical distance `2h`:
//!
//! ```text
//!   I(λ) ──► I(x), x = n/λ ──► uniform grid ──► |DFT| ──► argmax = 2h
//! ```
//!
//! The bin spacing `1/(N·dx)` limits the precision. With a padding factor
//! `P > 1` the transform is evaluated again at `P`-times finer spacing, but
//! only within two coarse bins of the first peak.

use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use super::{check_inputs, EstimateDetails, ThicknessEstimate};
use crate::data::model::RefractiveIndex;
use crate::diagnostics::{DiagnosticSink, NullSink, Series, SeriesKind};
use crate::error::{OptifikError, Result};
use crate::signal::LinearInterpolator;

/// Coarse bins searched on each side of the first peak when refining.
const REFINE_HALF_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FftOptions {
    /// Zero-padding factor of the refinement pass; `1` disables it.
    pub padding: usize,
    /// Half the number of uniform grid points; defaults to ten times the
    /// number of wavelengths.
    pub num_half_space: Option<usize>,
}

impl Default for FftOptions {
    fn default() -> Self {
        Self {
            padding: 1,
            num_half_space: None,
        }
    }
}

/// Estimate the film thickness from the dominant frequency of the spectrum.
///
/// The uncertainty is the frequency bin spacing of the pass that produced
/// the peak.
pub fn thickness_from_fft(
    wavelengths: &[f64],
    intensities: &[f64],
    refractive_index: &RefractiveIndex,
    options: &FftOptions,
    sink: Option<&mut dyn DiagnosticSink>,
) -> Result<ThicknessEstimate> {
    check_inputs(wavelengths, intensities, refractive_index)?;
    if options.padding == 0 {
        return Err(OptifikError::invalid("fft padding factor must be at least 1"));
    }
    let half_space = options.num_half_space.unwrap_or(10 * wavelengths.len());
    if half_space < 2 {
        return Err(OptifikError::invalid(format!(
            "fft half space needs at least 2 points, got {half_space}"
        )));
    }

    let mut null = NullSink;
    let sink: &mut dyn DiagnosticSink = match sink {
        Some(s) => s,
        None => &mut null,
    };

    // Resample onto a uniform n/λ grid.
    let x = refractive_index.over_wavelengths(wavelengths);
    let interpolator = LinearInterpolator::new(&x, intensities).ok_or(OptifikError::TooFewPoints {
        got: x.len(),
        min: 2,
    })?;
    let (grid, uniform) = interpolator.resample_uniform(2 * half_space);
    let len = grid.len();
    let density = grid[1] - grid[0];
    sink.emit(Series {
        figure: "fft_input",
        name: "resampled",
        kind: SeriesKind::Curve,
        x: &grid,
        y: &uniform,
    });

    // Without its mean, the constant offset cannot leak into the low bins.
    let mean = uniform.iter().sum::<f64>() / len as f64;
    let centred: Vec<f64> = uniform.iter().map(|v| v - mean).collect();

    // First pass over all positive frequencies.
    let mut buffer: Vec<Complex64> = centred.iter().map(|&v| Complex64::new(v, 0.0)).collect();
    FftPlanner::<f64>::new().plan_fft_forward(len).process(&mut buffer);

    let spacing = 1.0 / (len as f64 * density);
    let positive = 1..(len + 1) / 2;
    let freqs: Vec<f64> = positive.clone().map(|k| k as f64 * spacing).collect();
    let magnitudes: Vec<f64> = buffer[positive].iter().map(|c| c.norm()).collect();

    let peak = argmax(&magnitudes);
    let mut optical_distance = freqs[peak];
    let mut uncertainty = spacing;
    emit_peak(sink, "fft", &freqs, &magnitudes, peak);
    log::debug!(
        "fft: {len} grid points, peak bin {} at optical distance {optical_distance:.3} nm",
        peak + 1
    );

    if options.padding > 1 {
        let coarse_bin = peak + 1;
        match refine(&centred, density, coarse_bin, options.padding, sink) {
            Some((refined, fine_spacing)) => {
                optical_distance = refined;
                uncertainty = fine_spacing;
            }
            None => log::debug!(
                "fft: refined peak on the edge of the search window, keeping coarse estimate"
            ),
        }
    }

    Ok(ThicknessEstimate {
        thickness: optical_distance / 2.0,
        thickness_uncertainty: Some(uncertainty),
        details: EstimateDetails::Fft {
            optical_distance,
            grid_len: len,
            padding: options.padding,
        },
    })
}

/// Evaluate the zero-padded transform near `coarse_bin` and return the
/// refined peak frequency with the fine bin spacing. `None` when the
/// maximum sits on the window boundary.
fn refine(
    samples: &[f64],
    density: f64,
    coarse_bin: usize,
    padding: usize,
    sink: &mut dyn DiagnosticSink,
) -> Option<(f64, f64)> {
    let padded_len = samples.len() * padding;
    let fine_spacing = 1.0 / (padded_len as f64 * density);

    let bins: Vec<usize> = refine_window(coarse_bin, padding, padded_len).collect();
    let freqs: Vec<f64> = bins.iter().map(|&k| k as f64 * fine_spacing).collect();
    let magnitudes: Vec<f64> = bins
        .iter()
        .map(|&k| dft_bin(samples, k, padded_len).norm())
        .collect();

    let peak = argmax(&magnitudes);
    emit_peak(sink, "fft_padded", &freqs, &magnitudes, peak);
    log::debug!(
        "fft: padding x{padding}, {} fine bins, refined optical distance {:.3} nm",
        bins.len(),
        freqs[peak]
    );

    if peak == 0 || peak == bins.len() - 1 {
        return None;
    }
    Some((freqs[peak], fine_spacing))
}

/// Fine bins strictly within `REFINE_HALF_WIDTH` coarse bins of
/// `coarse_bin`, limited to the positive frequencies of a length
/// `padded_len` transform.
fn refine_window(coarse_bin: usize, padding: usize, padded_len: usize) -> RangeInclusive<usize> {
    let centre = coarse_bin * padding;
    let reach = REFINE_HALF_WIDTH * padding;
    let first = (centre + 1).saturating_sub(reach).max(1);
    let last = (centre + reach - 1).min((padded_len - 1) / 2);
    first..=last
}

/// Bin `k` of the length-`n` DFT of `samples` zero-padded to `n`.
fn dft_bin(samples: &[f64], k: usize, n: usize) -> Complex64 {
    let k = k as u64;
    let n64 = n as u64;
    samples
        .iter()
        .enumerate()
        .fold(Complex64::new(0.0, 0.0), |acc, (j, &v)| {
            let phase_index = (k * j as u64) % n64;
            let angle = -TAU * phase_index as f64 / n as f64;
            acc + Complex64::from_polar(v, angle)
        })
}

/// Index of the first largest value.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn emit_peak(
    sink: &mut dyn DiagnosticSink,
    figure: &'static str,
    freqs: &[f64],
    magnitudes: &[f64],
    peak: usize,
) {
    sink.emit(Series {
        figure,
        name: "magnitude",
        kind: SeriesKind::Curve,
        x: freqs,
        y: magnitudes,
    });
    sink.emit(Series {
        figure,
        name: "peak",
        kind: SeriesKind::Markers,
        x: &freqs[peak..=peak],
        y: &magnitudes[peak..=peak],
    });
}
