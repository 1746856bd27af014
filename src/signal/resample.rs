//! Linear resampling of scattered samples onto a uniform grid.

/// `num` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise-linear interpolant through `(x, y)` samples given in any order.
///
/// Outside the sampled range the first or last segment is extended.
/// Repeated abscissae yield non-finite values on the degenerate segment.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterpolator {
    /// Needs at least two samples of equal-length `x` and `y`.
    pub fn new(x: &[f64], y: &[f64]) -> Option<Self> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }
        let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = pairs.into_iter().unzip();
        Some(Self { x, y })
    }

    pub fn min_x(&self) -> f64 {
        self.x[0]
    }

    pub fn max_x(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn eval(&self, t: f64) -> f64 {
        // Index of the segment [lo, lo + 1] containing (or nearest to) t.
        let above = self.x.partition_point(|&xi| xi <= t);
        let lo = above.saturating_sub(1).min(self.x.len() - 2);
        let (x0, x1) = (self.x[lo], self.x[lo + 1]);
        let (y0, y1) = (self.y[lo], self.y[lo + 1]);
        y0 + (t - x0) * (y1 - y0) / (x1 - x0)
    }

    /// Values on `num` evenly spaced points spanning the sampled range.
    /// Returns `(grid, values)`.
    pub fn resample_uniform(&self, num: usize) -> (Vec<f64>, Vec<f64>) {
        let grid = linspace(self.min_x(), self.max_x(), num);
        let values = grid.iter().map(|&t| self.eval(t)).collect();
        (grid, values)
    }
}
