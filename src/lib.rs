//! Thickness of thin transparent films from their optical interference
//! spectra.
//!
//! ```text
//!   spectrum file ──► data::loader ──► Spectrum
//!                                         │
//!                          signal::smoothing (optional)
//!                                         │
//!                  ┌──────────────────────┴──────────────────────┐
//!                  ▼                                             ▼
//!           estimate::fft                                estimate::minmax
//!   (dominant frequency of I(n/λ))          (linear fit of n/λ at successive extrema)
//!                  │                                             │
//!                  └──────────────► ThicknessEstimate ◄──────────┘
//!                                         │
//!                                   uncertainty
//!                               (display rounding)
//! ```
//!
//! ```no_run
//! use std::path::Path;
//! use optifik::{load_spectrum, FftOptions, LoadOptions, RefractiveIndexModel};
//!
//! # fn main() -> optifik::Result<()> {
//! let spectrum = load_spectrum(Path::new("film.xy"), &LoadOptions::default())?;
//! let n = RefractiveIndexModel::WATER_TTAB.resolve(&spectrum.wavelengths);
//! let estimate = spectrum.thickness_fft(&n, &FftOptions::default())?;
//! if let Some(rounded) = estimate.rounded(1) {
//!     println!("h = {rounded} nm");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod estimate;
pub mod signal;
pub mod synthetic;
pub mod uncertainty;

pub use config::AnalysisConfig;
pub use data::loader::{load_spectrum, LoadOptions};
pub use data::model::{RefractiveIndex, RefractiveIndexModel, Spectrum};
pub use diagnostics::{DiagnosticSink, RecordingSink};
pub use error::{OptifikError, Result};
pub use estimate::{
    thickness_from_fft, thickness_from_minmax, EstimateDetails, FftOptions, MinMaxOptions,
    RansacOptions, RegressionMethod, ThicknessEstimate,
};
pub use signal::{find_extrema, smooth_intensities, PeakOptions, PeakSet, SmoothingOptions};
pub use uncertainty::{round_to_uncertainty, RoundedPair};
