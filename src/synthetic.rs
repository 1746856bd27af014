//! Ideal thin-film spectra, for tests and demonstration data.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::data::model::RefractiveIndexModel;
use crate::error::{OptifikError, Result};
pub use crate::signal::resample::linspace;

/// Reflected intensity of a free film of thickness `h` (nm) at each
/// wavelength, for refractive indices `n_values` aligned with `wavelengths`:
///
/// ```text
///            sin²(2π n h / λ)
/// I = ─────────────────────────────────
///      (2n / (n² − 1))² + sin²(2π n h / λ)
/// ```
pub fn interference_spectrum(h: f64, wavelengths: &[f64], n_values: &[f64]) -> Vec<f64> {
    wavelengths
        .iter()
        .zip(n_values)
        .map(|(&lambda, &n)| {
            let s = (2.0 * PI * n * h / lambda).sin().powi(2);
            let c = (2.0 * n / (n * n - 1.0)).powi(2);
            s / (c + s)
        })
        .collect()
}

/// Cauchy index of water with 1 CMC of TTAB at each wavelength.
pub fn water_ttab_index(wavelengths: &[f64]) -> Vec<f64> {
    RefractiveIndexModel::WATER_TTAB
        .resolve(wavelengths)
        .values(wavelengths.len())
}

/// Add zero-mean gaussian noise of standard deviation `std_dev` to every
/// sample.
pub fn add_gaussian_noise<R: Rng>(signal: &mut [f64], std_dev: f64, rng: &mut R) -> Result<()> {
    let normal = Normal::new(0.0, std_dev)
        .map_err(|e| OptifikError::invalid(format!("noise level {std_dev}: {e}")))?;
    for v in signal.iter_mut() {
        *v += normal.sample(rng);
    }
    Ok(())
}
