use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error type
// ---------------------------------------------------------------------------

/// Errors raised at the call boundary of the estimation engine.
///
/// Only malformed *parameters* end up here. Data-quality problems (too few
/// extrema, flat spectra, zero slopes) are reported through NaN/infinite
/// values in [`crate::ThicknessEstimate`] plus a `log::warn!`, so that a batch
/// of spectra is never halted by one bad sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptifikError {
    /// A parameter is outside of its valid domain (smoothing window, method
    /// name, padding factor, ...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Two sequences that must be aligned sample-by-sample are not.
    #[error("length mismatch: {wavelengths} wavelengths but {other} {what}")]
    LengthMismatch {
        wavelengths: usize,
        other: usize,
        what: &'static str,
    },

    /// Not enough samples for the requested operation.
    #[error("too few points: got {got}, need at least {min}")]
    TooFewPoints { got: usize, min: usize },

    /// Wavelengths not finite and strictly increasing, or a non-finite
    /// intensity.
    #[error("invalid spectrum: {0}")]
    InvalidSpectrum(String),

    /// Spectrum file could not be read or parsed.
    #[error("cannot load spectrum: {0}")]
    Load(String),
}

pub type Result<T> = std::result::Result<T, OptifikError>;

impl OptifikError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        OptifikError::InvalidParameter(msg.into())
    }
}
