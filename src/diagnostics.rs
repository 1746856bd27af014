//! Optional visualisation hook.
//!
//! Estimators publish the intermediate curves they compute (smoothed
//! spectrum, detected extrema, Fourier magnitudes, regression lines) to a
//! [`DiagnosticSink`] when one is supplied. Nothing in the engine reads back
//! from the sink, so results are identical with or without one.

use serde::Serialize;

/// How a series is meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// Connected samples.
    Curve,
    /// Isolated points (peaks, inliers, ...).
    Markers,
    /// A fitted model evaluated on the data's x-values.
    Line,
}

/// A named (x, y) series borrowed from the estimator.
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    /// Groups series that belong on the same plot, e.g. `"fft"`.
    pub figure: &'static str,
    pub name: &'static str,
    pub kind: SeriesKind,
    pub x: &'a [f64],
    pub y: &'a [f64],
}

/// Receiver of diagnostic series.
pub trait DiagnosticSink {
    fn emit(&mut self, series: Series<'_>);
}

/// Owned copy of a [`Series`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedSeries {
    pub figure: String,
    pub name: String,
    pub kind: SeriesKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Sink that keeps everything it receives, in emission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordingSink {
    pub series: Vec<RecordedSeries>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// First recorded series with the given figure and name.
    pub fn get(&self, figure: &str, name: &str) -> Option<&RecordedSeries> {
        self.series
            .iter()
            .find(|s| s.figure == figure && s.name == name)
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, series: Series<'_>) {
        self.series.push(RecordedSeries {
            figure: series.figure.to_string(),
            name: series.name.to_string(),
            kind: series.kind,
            x: series.x.to_vec(),
            y: series.y.to_vec(),
        });
    }
}

/// Sink that drops everything; stands in when the caller passes none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _series: Series<'_>) {}
}
