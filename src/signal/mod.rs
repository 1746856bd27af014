//! Signal utilities shared by the estimators: smoothing, extrema detection
//! and uniform resampling.

pub mod peaks;
pub mod resample;
pub mod smoothing;

pub use peaks::{find_extrema, find_peaks, peak_prominences, PeakOptions, PeakSet};
pub use resample::{linspace, LinearInterpolator};
pub use smoothing::{smooth_intensities, SavitzkyGolay, SmoothingOptions};
