//! Savitzky–Golay smoothing.
//!
//! Every output sample is the value, at that sample, of a least-squares
//! polynomial fitted over a window of neighbouring samples. The first and
//! last `window_size / 2` samples have no centred window; they are read off
//! the polynomial fitted to the first (resp. last) full window, so the output
//! has the input's length.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{OptifikError, Result};

/// Window and polynomial order of the smoothing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingOptions {
    /// Odd number of samples per local fit.
    pub window_size: usize,
    /// Degree of the local polynomial; must be below `window_size`.
    pub poly_order: usize,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            window_size: 11,
            poly_order: 3,
        }
    }
}

/// A Savitzky–Golay filter with its projection matrix precomputed.
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window_size: usize,
    /// `(poly_order + 1) × window_size` pseudo-inverse of the window's
    /// Vandermonde matrix; row `j` gives the `t^j` coefficient of the fit.
    projection: DMatrix<f64>,
}

impl SavitzkyGolay {
    pub fn new(window_size: usize, poly_order: usize) -> Result<Self> {
        if window_size % 2 == 0 {
            return Err(OptifikError::invalid(format!(
                "smoothing window must be odd, got {window_size}"
            )));
        }
        if window_size <= poly_order {
            return Err(OptifikError::invalid(format!(
                "smoothing window {window_size} must exceed polynomial order {poly_order}"
            )));
        }

        let half = (window_size / 2) as f64;
        let vandermonde = DMatrix::from_fn(window_size, poly_order + 1, |i, j| {
            (i as f64 - half).powi(j as i32)
        });
        let projection = vandermonde
            .pseudo_inverse(1e-12)
            .map_err(|e| OptifikError::invalid(format!("smoothing fit: {e}")))?;

        Ok(Self {
            window_size,
            projection,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn poly_order(&self) -> usize {
        self.projection.nrows() - 1
    }

    /// Smooth `data`. Fails when the window is longer than the data.
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        let w = self.window_size;
        let n = data.len();
        if w > n {
            return Err(OptifikError::invalid(format!(
                "smoothing window {w} is longer than the {n} input samples"
            )));
        }
        let half = w / 2;
        let mut out = vec![0.0; n];

        // Interior: convolution with the centre row.
        for i in half..n - half {
            let window = &data[i - half..=i + half];
            out[i] = self
                .projection
                .row(0)
                .iter()
                .zip(window)
                .map(|(c, y)| c * y)
                .sum::<f64>();
        }

        // Edges: evaluate the polynomial of the outermost full windows.
        let head = self.fit(&data[..w]);
        for (i, slot) in out.iter_mut().take(half).enumerate() {
            *slot = eval_poly(&head, i as f64 - half as f64);
        }
        let tail = self.fit(&data[n - w..]);
        for i in n - half..n {
            let t = (i - (n - w)) as f64 - half as f64;
            out[i] = eval_poly(&tail, t);
        }

        Ok(out)
    }

    /// Polynomial coefficients (lowest degree first) fitted to one window.
    fn fit(&self, window: &[f64]) -> Vec<f64> {
        self.projection
            .row_iter()
            .map(|row| row.iter().zip(window).map(|(c, y)| c * y).sum::<f64>())
            .collect()
    }
}

fn eval_poly(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

/// Smooth an intensity sequence with a Savitzky–Golay filter.
pub fn smooth_intensities(intensities: &[f64], options: &SmoothingOptions) -> Result<Vec<f64>> {
    SavitzkyGolay::new(options.window_size, options.poly_order)?.apply(intensities)
}
