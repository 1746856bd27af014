use serde::{Deserialize, Serialize};

use crate::error::{OptifikError, Result};

// ---------------------------------------------------------------------------
// Spectrum – one interference measurement
// ---------------------------------------------------------------------------

/// A measured spectrum: intensities sampled at strictly increasing
/// wavelengths (nm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Wavelength axis in nm.
    pub wavelengths: Vec<f64>,
    /// Intensity axis (arbitrary units) – same length as `wavelengths`.
    pub intensities: Vec<f64>,
}

impl Spectrum {
    /// Build a spectrum, checking that both axes line up, hold at least
    /// two samples, and satisfy [`check_axes`].
    pub fn new(wavelengths: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        check_axes(&wavelengths, &intensities)?;
        Ok(Spectrum {
            wavelengths,
            intensities,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Whether the spectrum holds no samples.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Keep the samples with `min <= λ <= max` (both bounds included).
    pub fn crop(&self, min: f64, max: f64) -> Spectrum {
        let (wavelengths, intensities) = self
            .wavelengths
            .iter()
            .zip(&self.intensities)
            .filter(|(w, _)| **w >= min && **w <= max)
            .map(|(w, i)| (*w, *i))
            .unzip();
        Spectrum {
            wavelengths,
            intensities,
        }
    }
}

/// Checks shared by [`Spectrum::new`] and the estimators: equal lengths,
/// at least two samples, finite and strictly increasing wavelengths, finite
/// intensities.
pub fn check_axes(wavelengths: &[f64], intensities: &[f64]) -> Result<()> {
    if wavelengths.len() != intensities.len() {
        return Err(OptifikError::LengthMismatch {
            wavelengths: wavelengths.len(),
            other: intensities.len(),
            what: "intensities",
        });
    }
    if wavelengths.len() < 2 {
        return Err(OptifikError::TooFewPoints {
            got: wavelengths.len(),
            min: 2,
        });
    }
    if let Some(i) = wavelengths.iter().position(|w| !w.is_finite()) {
        return Err(OptifikError::InvalidSpectrum(format!(
            "wavelength {} at sample {i} is not finite",
            wavelengths[i]
        )));
    }
    if let Some(i) = wavelengths.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(OptifikError::InvalidSpectrum(format!(
            "wavelengths must be strictly increasing, got {} then {} at sample {}",
            wavelengths[i],
            wavelengths[i + 1],
            i + 1
        )));
    }
    if let Some(i) = intensities.iter().position(|v| !v.is_finite()) {
        return Err(OptifikError::InvalidSpectrum(format!(
            "intensity {} at sample {i} is not finite",
            intensities[i]
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// RefractiveIndex – n(λ) aligned with a spectrum
// ---------------------------------------------------------------------------

/// Refractive index of the film, either uniform or given per wavelength
/// sample.
#[derive(Debug, Clone, PartialEq)]
pub enum RefractiveIndex {
    Constant(f64),
    /// One value per sample, aligned with the spectrum's wavelengths.
    Profile(Vec<f64>),
}

impl RefractiveIndex {
    /// Cauchy dispersion `n(λ) = a + b / λ²` evaluated on `wavelengths`.
    pub fn cauchy(a: f64, b: f64, wavelengths: &[f64]) -> Self {
        RefractiveIndex::Profile(wavelengths.iter().map(|w| a + b / (w * w)).collect())
    }

    /// Value at sample `i`.
    #[inline]
    pub fn at(&self, i: usize) -> f64 {
        match self {
            RefractiveIndex::Constant(n) => *n,
            RefractiveIndex::Profile(values) => values[i],
        }
    }

    /// The index at each of `len` samples.
    pub fn values(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.at(i)).collect()
    }

    /// Fail unless the index can be read at every sample of a spectrum with
    /// `len` wavelengths.
    pub fn check_aligned(&self, len: usize) -> Result<()> {
        match self {
            RefractiveIndex::Profile(values) if values.len() != len => {
                Err(OptifikError::LengthMismatch {
                    wavelengths: len,
                    other: values.len(),
                    what: "refractive index values",
                })
            }
            _ => Ok(()),
        }
    }

    /// `n(λ_i) / λ_i` for every sample.
    pub fn over_wavelengths(&self, wavelengths: &[f64]) -> Vec<f64> {
        wavelengths
            .iter()
            .enumerate()
            .map(|(i, w)| self.at(i) / w)
            .collect()
    }
}

impl From<f64> for RefractiveIndex {
    fn from(n: f64) -> Self {
        RefractiveIndex::Constant(n)
    }
}

impl From<Vec<f64>> for RefractiveIndex {
    fn from(values: Vec<f64>) -> Self {
        RefractiveIndex::Profile(values)
    }
}

/// Configurable description of the film's refractive index, resolved
/// against a wavelength axis once a spectrum is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RefractiveIndexModel {
    Constant { value: f64 },
    Cauchy { a: f64, b: f64 },
}

impl RefractiveIndexModel {
    /// Water with 1 CMC of TTAB.
    pub const WATER_TTAB: RefractiveIndexModel = RefractiveIndexModel::Cauchy {
        a: 1.324188,
        b: 3102.060378,
    };

    pub fn resolve(&self, wavelengths: &[f64]) -> RefractiveIndex {
        match *self {
            RefractiveIndexModel::Constant { value } => RefractiveIndex::Constant(value),
            RefractiveIndexModel::Cauchy { a, b } => RefractiveIndex::cauchy(a, b, wavelengths),
        }
    }
}

impl Default for RefractiveIndexModel {
    fn default() -> Self {
        RefractiveIndexModel::WATER_TTAB
    }
}
