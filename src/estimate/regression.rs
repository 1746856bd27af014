//! Straight-line fits: ordinary least squares and RANSAC.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{OptifikError, Result};

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Least-squares line `y = intercept + slope * x` with its standard errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient.
    pub r_value: f64,
    /// Standard error of the slope.
    pub stderr: f64,
    /// Standard error of the intercept.
    pub intercept_stderr: f64,
}

impl LinearFit {
    /// Fit `y` against `x`. A two-point fit is exact and reports zero
    /// standard errors. Constant `x` yields non-finite coefficients.
    pub fn ordinary(x: &[f64], y: &[f64]) -> Self {
        debug_assert_eq!(x.len(), y.len());
        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let y_mean = y.iter().sum::<f64>() / n;

        let (mut ssxm, mut ssym, mut ssxym) = (0.0, 0.0, 0.0);
        for (xi, yi) in x.iter().zip(y) {
            let dx = xi - x_mean;
            let dy = yi - y_mean;
            ssxm += dx * dx;
            ssym += dy * dy;
            ssxym += dx * dy;
        }

        let slope = ssxym / ssxm;
        let intercept = y_mean - slope * x_mean;

        let r_value = if ssxm == 0.0 || ssym == 0.0 {
            0.0
        } else {
            (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
        };

        let (stderr, intercept_stderr) = if x.len() == 2 {
            (0.0, 0.0)
        } else {
            let df = n - 2.0;
            let stderr = ((1.0 - r_value * r_value) * ssym / ssxm / df).sqrt();
            let sum_x2 = ssxm + n * x_mean * x_mean;
            (stderr, stderr * (sum_x2 / n).sqrt())
        };

        LinearFit {
            slope,
            intercept,
            r_value,
            stderr,
            intercept_stderr,
        }
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Coefficient of determination of `fit` on `(x, y)`.
fn r_squared(fit: &LinearFit, x: &[f64], y: &[f64]) -> f64 {
    let y_mean = y.iter().sum::<f64>() / y.len() as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let r = yi - fit.predict(*xi);
        ss_res += r * r;
        ss_tot += (yi - y_mean) * (yi - y_mean);
    }
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

// ---------------------------------------------------------------------------
// RANSAC
// ---------------------------------------------------------------------------

/// Parameters of the random sample consensus fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacOptions {
    /// Largest absolute residual for a point to count as an inlier.
    pub residual_threshold: f64,
    /// Points drawn per trial.
    pub min_samples: usize,
    /// Upper bound on the number of trials.
    pub max_trials: usize,
    /// Confidence at which the trial budget may be cut short once a
    /// consensus set has been found.
    pub stop_probability: f64,
    /// Seed for the sampler; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            residual_threshold: 4e-4,
            min_samples: 2,
            max_trials: 100,
            stop_probability: 0.99,
            seed: None,
        }
    }
}

impl RansacOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.residual_threshold > 0.0 && self.residual_threshold.is_finite()) {
            return Err(OptifikError::invalid(format!(
                "ransac residual threshold must be positive and finite, got {}",
                self.residual_threshold
            )));
        }
        if self.min_samples < 2 {
            return Err(OptifikError::invalid(format!(
                "ransac needs at least 2 samples per trial, got {}",
                self.min_samples
            )));
        }
        if self.max_trials == 0 {
            return Err(OptifikError::invalid("ransac needs at least one trial"));
        }
        if !(0.0..=1.0).contains(&self.stop_probability) {
            return Err(OptifikError::invalid(format!(
                "ransac stop probability must lie in [0, 1], got {}",
                self.stop_probability
            )));
        }
        Ok(())
    }
}

/// Outcome of [`ransac`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RansacFit {
    /// Least-squares refit on the inliers alone.
    pub fit: LinearFit,
    /// `true` for every point within the residual threshold of the
    /// consensus model.
    pub inliers: Vec<bool>,
    /// Trials actually run.
    pub trials: usize,
}

impl RansacFit {
    pub fn num_inliers(&self) -> usize {
        self.inliers.iter().filter(|&&b| b).count()
    }

    pub fn num_outliers(&self) -> usize {
        self.inliers.len() - self.num_inliers()
    }
}

/// Robust line fit of `y` against `x`.
///
/// Each trial fits a line through `min_samples` random points and counts
/// the points within `residual_threshold` of it. The largest consensus set
/// wins, ties broken by the R² of the trial model on that set. The returned
/// line is an ordinary least-squares refit on the winning inliers.
///
/// Returns `None` when fewer than `min_samples` points are given or no
/// trial produced a usable model.
pub fn ransac<R: Rng + ?Sized>(
    x: &[f64],
    y: &[f64],
    options: &RansacOptions,
    rng: &mut R,
) -> Option<RansacFit> {
    let n = x.len();
    let m = options.min_samples;
    if n < m || n != y.len() {
        return None;
    }

    let mut best: Option<(usize, f64, Vec<bool>)> = None;
    let mut budget = options.max_trials;
    let mut trials = 0;
    let mut sample_x = vec![0.0; m];
    let mut sample_y = vec![0.0; m];

    while trials < budget {
        trials += 1;

        for (slot, i) in index::sample(rng, n, m).into_iter().enumerate() {
            sample_x[slot] = x[i];
            sample_y[slot] = y[i];
        }
        let model = LinearFit::ordinary(&sample_x, &sample_y);
        if !(model.slope.is_finite() && model.intercept.is_finite()) {
            continue;
        }

        let mask: Vec<bool> = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - model.predict(*xi)).abs() <= options.residual_threshold)
            .collect();
        let count = mask.iter().filter(|&&b| b).count();
        if count == 0 {
            continue;
        }

        let (in_x, in_y) = select(x, y, &mask);
        let score = r_squared(&model, &in_x, &in_y);

        let better = match &best {
            None => true,
            Some((best_count, best_score, _)) => {
                count > *best_count || (count == *best_count && score > *best_score)
            }
        };
        if better {
            budget = budget.min(dynamic_max_trials(count, n, m, options.stop_probability));
            best = Some((count, score, mask));
        }
        if count == n {
            break;
        }
    }

    let (_, _, inliers) = best?;
    let (in_x, in_y) = select(x, y, &inliers);
    Some(RansacFit {
        fit: LinearFit::ordinary(&in_x, &in_y),
        inliers,
        trials,
    })
}

fn select(x: &[f64], y: &[f64], mask: &[bool]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|((xi, yi), _)| (*xi, *yi))
        .unzip()
}

/// Trials needed to draw at least one outlier-free sample with
/// `probability`, given the current inlier ratio.
fn dynamic_max_trials(inliers: usize, total: usize, min_samples: usize, probability: f64) -> usize {
    let inlier_ratio = inliers as f64 / total as f64;
    let nom = 1.0 - probability;
    if nom <= 0.0 {
        return usize::MAX;
    }
    let denom = 1.0 - inlier_ratio.powi(min_samples as i32);
    if denom <= 0.0 {
        return 1;
    }
    if denom >= 1.0 {
        return usize::MAX;
    }
    (nom.ln() / denom.ln()).ceil().max(1.0) as usize
}
