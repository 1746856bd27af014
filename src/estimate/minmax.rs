//! Extrema-regression thickness estimate.
//!
//! Successive extrema of a thin-film spectrum are half an interference order
//! apart, so `n(λ_k)/λ_k` at the k-th extremum (counted from the long
//! wavelength end) grows linearly with `k`, with slope `1/(4h)`.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::regression::{ransac, LinearFit, RansacOptions};
use super::{check_inputs, EstimateDetails, ThicknessEstimate};
use crate::data::model::RefractiveIndex;
use crate::diagnostics::{DiagnosticSink, NullSink, Series, SeriesKind};
use crate::error::{OptifikError, Result};
use crate::signal::{find_extrema, PeakOptions, PeakSet};

/// Line-fitting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionMethod {
    /// Ordinary least squares over all extrema.
    #[default]
    LinReg,
    /// Least squares over the RANSAC inliers only.
    Ransac,
}

impl FromStr for RegressionMethod {
    type Err = OptifikError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linreg" => Ok(RegressionMethod::LinReg),
            "ransac" => Ok(RegressionMethod::Ransac),
            other => Err(OptifikError::invalid(format!(
                "unknown regression method '{other}' (expected 'linreg' or 'ransac')"
            ))),
        }
    }
}

impl fmt::Display for RegressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegressionMethod::LinReg => write!(f, "linreg"),
            RegressionMethod::Ransac => write!(f, "ransac"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinMaxOptions {
    pub peaks: PeakOptions,
    pub method: RegressionMethod,
    /// Only read when `method` is [`RegressionMethod::Ransac`].
    pub ransac: RansacOptions,
}

/// Estimate the film thickness from the positions of the spectrum's extrema.
///
/// With fewer than two extrema the thickness is NaN and a warning is
/// logged; the call itself still succeeds.
pub fn thickness_from_minmax(
    wavelengths: &[f64],
    intensities: &[f64],
    refractive_index: &RefractiveIndex,
    options: &MinMaxOptions,
    sink: Option<&mut dyn DiagnosticSink>,
) -> Result<ThicknessEstimate> {
    check_inputs(wavelengths, intensities, refractive_index)?;
    if options.method == RegressionMethod::Ransac {
        options.ransac.validate()?;
    }

    let mut null = NullSink;
    let sink: &mut dyn DiagnosticSink = match sink {
        Some(s) => s,
        None => &mut null,
    };

    let peaks = find_extrema(intensities, &options.peaks);
    peaks.emit(wavelengths, intensities, sink);

    let combined = peaks.combined();
    if combined.len() < 2 {
        log::warn!(
            "found {} extrema, at least 2 are needed to fit; thickness set to NaN",
            combined.len()
        );
        return Ok(unfit(peaks, options.method));
    }

    // Long wavelengths first, so that n/λ increases with k.
    let n_over_lambda: Vec<f64> = combined
        .iter()
        .rev()
        .map(|&i| refractive_index.at(i) / wavelengths[i])
        .collect();
    let k: Vec<f64> = (0..n_over_lambda.len()).map(|i| i as f64).collect();

    let (fit, inliers) = match options.method {
        RegressionMethod::LinReg => (LinearFit::ordinary(&k, &n_over_lambda), None),
        RegressionMethod::Ransac => {
            let mut rng = match options.ransac.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            match ransac(&k, &n_over_lambda, &options.ransac, &mut rng) {
                Some(result) => (result.fit, Some(result.inliers)),
                None => {
                    log::warn!("ransac found no consensus set; thickness set to NaN");
                    return Ok(unfit(peaks, options.method));
                }
            }
        }
    };

    emit_fit(sink, &k, &n_over_lambda, &fit, inliers.as_deref());

    let thickness = 1.0 / (4.0 * fit.slope);
    let thickness_uncertainty = fit.stderr / (4.0 * fit.slope * fit.slope);
    if !thickness.is_finite() {
        log::warn!("degenerate extrema fit (slope {}), thickness is not finite", fit.slope);
    }
    log::debug!(
        "minmax/{}: {} extrema, slope {:e} ± {:e}, h = {thickness:.2} nm",
        options.method,
        combined.len(),
        fit.slope,
        fit.stderr
    );

    let (num_inliers, num_outliers) = match &inliers {
        Some(mask) => {
            let count = mask.iter().filter(|&&b| b).count();
            (Some(count), Some(mask.len() - count))
        }
        None => (None, None),
    };

    Ok(ThicknessEstimate {
        thickness,
        thickness_uncertainty: Some(thickness_uncertainty),
        details: EstimateDetails::MinMax {
            peaks,
            regression: options.method,
            stderr: Some(fit.stderr),
            num_inliers,
            num_outliers,
        },
    })
}

fn unfit(peaks: PeakSet, regression: RegressionMethod) -> ThicknessEstimate {
    ThicknessEstimate {
        thickness: f64::NAN,
        thickness_uncertainty: None,
        details: EstimateDetails::MinMax {
            peaks,
            regression,
            stderr: None,
            num_inliers: None,
            num_outliers: None,
        },
    }
}

fn emit_fit(
    sink: &mut dyn DiagnosticSink,
    k: &[f64],
    n_over_lambda: &[f64],
    fit: &LinearFit,
    inliers: Option<&[bool]>,
) {
    match inliers {
        None => sink.emit(Series {
            figure: "minmax_fit",
            name: "extrema",
            kind: SeriesKind::Markers,
            x: k,
            y: n_over_lambda,
        }),
        Some(mask) => {
            for (name, wanted) in [("inliers", true), ("outliers", false)] {
                let (x, y): (Vec<f64>, Vec<f64>) = k
                    .iter()
                    .zip(n_over_lambda)
                    .zip(mask)
                    .filter(|(_, m)| **m == wanted)
                    .map(|((a, b), _)| (*a, *b))
                    .unzip();
                sink.emit(Series {
                    figure: "minmax_fit",
                    name,
                    kind: SeriesKind::Markers,
                    x: &x,
                    y: &y,
                });
            }
        }
    }
    let line: Vec<f64> = k.iter().map(|&v| fit.predict(v)).collect();
    sink.emit(Series {
        figure: "minmax_fit",
        name: "fit",
        kind: SeriesKind::Line,
        x: k,
        y: &line,
    });
}
