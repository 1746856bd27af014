//! Extrema detection with prominence and distance constraints.
//!
//! Local maxima are found first (a flat plateau counts once, at its middle
//! sample), then thinned so that no two survivors are closer than
//! `min_distance` samples (taller peaks win), and finally filtered on
//! prominence. Minima are the maxima of the negated signal.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticSink, Series, SeriesKind};

/// Constraints applied to detected extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakOptions {
    /// Minimum prominence; `None` keeps every peak regardless of prominence.
    pub min_prominence: Option<f64>,
    /// Minimum index separation between two peaks of the same kind.
    pub min_distance: usize,
}

impl Default for PeakOptions {
    fn default() -> Self {
        Self {
            min_prominence: None,
            min_distance: 10,
        }
    }
}

/// Indices of the detected maxima and minima, each ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeakSet {
    pub maxima: Vec<usize>,
    pub minima: Vec<usize>,
}

impl PeakSet {
    /// Total number of extrema.
    pub fn len(&self) -> usize {
        self.maxima.len() + self.minima.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty() && self.minima.is_empty()
    }

    /// Maxima and minima merged into one ascending sequence.
    pub fn combined(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.maxima.iter().chain(&self.minima).copied().collect();
        all.sort_unstable();
        all
    }

    /// Publish the signal and the detected extrema under figure `"extrema"`.
    pub fn emit(&self, wavelengths: &[f64], intensities: &[f64], sink: &mut dyn DiagnosticSink) {
        sink.emit(Series {
            figure: "extrema",
            name: "intensities",
            kind: SeriesKind::Curve,
            x: wavelengths,
            y: intensities,
        });
        for (name, indices) in [("maxima", &self.maxima), ("minima", &self.minima)] {
            let x: Vec<f64> = indices.iter().map(|&i| wavelengths[i]).collect();
            let y: Vec<f64> = indices.iter().map(|&i| intensities[i]).collect();
            sink.emit(Series {
                figure: "extrema",
                name,
                kind: SeriesKind::Markers,
                x: &x,
                y: &y,
            });
        }
    }
}

/// Detect the maxima and minima of `intensities`.
pub fn find_extrema(intensities: &[f64], options: &PeakOptions) -> PeakSet {
    let negated: Vec<f64> = intensities.iter().map(|v| -v).collect();
    let peaks = PeakSet {
        maxima: find_peaks(intensities, options),
        minima: find_peaks(&negated, options),
    };
    log::debug!(
        "found {} maxima and {} minima (prominence {:?}, distance {})",
        peaks.maxima.len(),
        peaks.minima.len(),
        options.min_prominence,
        options.min_distance
    );
    peaks
}

/// Ascending indices of the maxima of `x` satisfying `options`.
pub fn find_peaks(x: &[f64], options: &PeakOptions) -> Vec<usize> {
    let mut peaks = local_maxima(x);
    if options.min_distance > 1 {
        peaks = select_by_distance(x, &peaks, options.min_distance);
    }
    if let Some(min_prominence) = options.min_prominence {
        let prominences = peak_prominences(x, &peaks);
        peaks = peaks
            .into_iter()
            .zip(prominences)
            .filter(|(_, p)| *p >= min_prominence)
            .map(|(i, _)| i)
            .collect();
    }
    peaks
}

/// Strict local maxima; a plateau bounded by lower samples on both sides
/// yields its middle index (rounded down). The end samples never qualify.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Drop peaks closer than `distance` to a taller one.
///
/// Peaks are visited from tallest to shortest; among equal heights the one
/// with the larger index is visited first, so the outcome depends only on
/// the input values.
fn select_by_distance(x: &[f64], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| x[peaks[a]].total_cmp(&x[peaks[b]]));

    let mut keep = vec![true; peaks.len()];
    for &j in order.iter().rev() {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(p, _)| *p)
        .collect()
}

/// Prominence of each peak: its height above the higher of the two lowest
/// points reached before meeting a taller sample (or the signal end) on
/// either side.
pub fn peak_prominences(x: &[f64], peaks: &[usize]) -> Vec<f64> {
    peaks
        .iter()
        .map(|&peak| {
            let height = x[peak];

            let mut left_min = height;
            for &v in x[..=peak].iter().rev() {
                if v > height {
                    break;
                }
                left_min = left_min.min(v);
            }

            let mut right_min = height;
            for &v in &x[peak..] {
                if v > height {
                    break;
                }
                right_min = right_min.min(v);
            }

            height - left_min.max(right_min)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plateau_reports_its_middle() {
        let x = [0.0, 1.0, 2.0, 2.0, 2.0, 1.0, 0.0];
        assert_eq!(local_maxima(&x), vec![3]);
        let x = [0.0, 2.0, 2.0, 1.0];
        assert_eq!(local_maxima(&x), vec![1]);
    }

    #[test]
    fn edges_and_open_plateaus_are_not_peaks() {
        let x = [3.0, 1.0, 2.0, 2.0];
        assert!(local_maxima(&x).is_empty());
    }

    #[test]
    fn distance_keeps_the_taller_neighbour() {
        let x = [0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0];
        let options = PeakOptions {
            min_prominence: None,
            min_distance: 3,
        };
        assert_eq!(find_peaks(&x, &options), vec![3]);
    }

    #[test]
    fn prominence_uses_the_higher_base() {
        let x = [0.0, 5.0, 1.0, 3.0, 2.0, 4.0, 0.0];
        let prominences = peak_prominences(&x, &[1, 3, 5]);
        assert_eq!(prominences, vec![5.0, 1.0, 3.0]);

        let options = PeakOptions {
            min_prominence: Some(2.0),
            min_distance: 1,
        };
        assert_eq!(find_peaks(&x, &options), vec![1, 5]);
    }

    #[test]
    fn minima_come_from_the_negated_signal() {
        let x = [1.0, 0.0, 1.0, 2.0, 1.0, -1.0, 1.0];
        let options = PeakOptions {
            min_prominence: None,
            min_distance: 1,
        };
        let peaks = find_extrema(&x, &options);
        assert_eq!(peaks.maxima, vec![3]);
        assert_eq!(peaks.minima, vec![1, 5]);
        assert_eq!(peaks.combined(), vec![1, 3, 5]);
    }
}
