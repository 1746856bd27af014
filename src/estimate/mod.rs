//! Thickness estimators and their common result record.
//!
//! Two independent methods are provided:
//!
//! * [`fft`] – dominant frequency of the spectrum resampled on a uniform
//!   `n(λ)/λ` grid, optionally refined with zero padding.
//! * [`minmax`] – linear regression of `n(λ)/λ` at successive extrema
//!   against their ordinal index.
//!
//! Both validate their parameters up front and report data problems through
//! non-finite values rather than errors.

pub mod fft;
pub mod minmax;
pub mod regression;

use serde::Serialize;

use crate::data::model::{check_axes, RefractiveIndex, Spectrum};
use crate::error::Result;
use crate::signal::PeakSet;
use crate::uncertainty::{round_to_uncertainty, RoundedPair};

pub use fft::{thickness_from_fft, FftOptions};
pub use minmax::{thickness_from_minmax, MinMaxOptions, RegressionMethod};
pub use regression::{ransac, LinearFit, RansacFit, RansacOptions};

/// Result of one estimator call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThicknessEstimate {
    /// Film thickness in nm, NaN when the data did not allow an estimate.
    pub thickness: f64,
    /// One-sigma (minmax) or resolution-limited (FFT) uncertainty in nm.
    pub thickness_uncertainty: Option<f64>,
    /// Method-specific information, for display only.
    pub details: EstimateDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EstimateDetails {
    Fft {
        /// Position of the dominant Fourier peak (optical distance, nm).
        optical_distance: f64,
        /// Samples on the uniform grid.
        grid_len: usize,
        /// Zero-padding factor used for the final peak position.
        padding: usize,
    },
    MinMax {
        peaks: PeakSet,
        regression: RegressionMethod,
        /// Standard error of the fitted slope.
        stderr: Option<f64>,
        num_inliers: Option<usize>,
        num_outliers: Option<usize>,
    },
}

impl ThicknessEstimate {
    /// Whether a finite thickness was obtained.
    pub fn is_valid(&self) -> bool {
        self.thickness.is_finite()
    }

    /// Thickness and uncertainty rounded for display; `None` without an
    /// uncertainty.
    pub fn rounded(&self, digits: u32) -> Option<RoundedPair> {
        self.thickness_uncertainty
            .map(|u| round_to_uncertainty(self.thickness, u, digits))
    }
}

/// Shared argument checks of both estimators.
pub(crate) fn check_inputs(
    wavelengths: &[f64],
    intensities: &[f64],
    refractive_index: &RefractiveIndex,
) -> Result<()> {
    check_axes(wavelengths, intensities)?;
    refractive_index.check_aligned(wavelengths.len())
}

impl Spectrum {
    /// [`thickness_from_fft`] on this spectrum, without diagnostics.
    pub fn thickness_fft(
        &self,
        refractive_index: &RefractiveIndex,
        options: &FftOptions,
    ) -> Result<ThicknessEstimate> {
        thickness_from_fft(
            &self.wavelengths,
            &self.intensities,
            refractive_index,
            options,
            None,
        )
    }

    /// [`thickness_from_minmax`] on this spectrum, without diagnostics.
    pub fn thickness_minmax(
        &self,
        refractive_index: &RefractiveIndex,
        options: &MinMaxOptions,
    ) -> Result<ThicknessEstimate> {
        thickness_from_minmax(
            &self.wavelengths,
            &self.intensities,
            refractive_index,
            options,
            None,
        )
    }
}
