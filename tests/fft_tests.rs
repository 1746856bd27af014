//! Tests for the frequency-domain thickness estimate.
//!
//! ## Test Organization
//!
//! 1. **Synthetic Films** - recovered thickness, with and without padding
//! 2. **Resolution** - reported uncertainty and refinement
//! 3. **Parameters** - rejected inputs

use approx::assert_relative_eq;

use optifik::synthetic::{interference_spectrum, linspace, water_ttab_index};
use optifik::{
    thickness_from_fft, EstimateDetails, FftOptions, OptifikError, RecordingSink,
    RefractiveIndex,
};

fn film(h: f64) -> (Vec<f64>, Vec<f64>, RefractiveIndex) {
    let lambdas = linspace(450.0, 800.0, 1000);
    let n = water_ttab_index(&lambdas);
    let intensities = interference_spectrum(h, &lambdas, &n);
    (lambdas, intensities, RefractiveIndex::Profile(n))
}

fn padded(padding: usize) -> FftOptions {
    FftOptions {
        padding,
        ..FftOptions::default()
    }
}

// ============================================================================
// Synthetic Films
// ============================================================================

/// With refinement the estimate lands within a few percent.
#[test]
fn test_padded_estimate_recovers_thickness() {
    for h in [3000.0, 6000.0, 10000.0, 20000.0] {
        let (lambdas, intensities, n) = film(h);
        let estimate = thickness_from_fft(&lambdas, &intensities, &n, &padded(10), None).unwrap();

        assert!(estimate.is_valid());
        assert_relative_eq!(estimate.thickness, h, max_relative = 0.05);
    }
}

/// Sub-micron films: the constant offset must not pull the padded peak to
/// the edge of the refinement window.
#[test]
fn test_padded_estimate_on_thin_films() {
    for h in [500.0, 1200.0] {
        let (lambdas, intensities, n) = film(h);
        let coarse =
            thickness_from_fft(&lambdas, &intensities, &n, &FftOptions::default(), None).unwrap();
        let fine = thickness_from_fft(&lambdas, &intensities, &n, &padded(10), None).unwrap();

        assert_relative_eq!(fine.thickness, h, max_relative = 0.05);
        // Refinement was kept: ten times finer bins.
        assert_relative_eq!(
            fine.thickness_uncertainty.unwrap() * 10.0,
            coarse.thickness_uncertainty.unwrap(),
            max_relative = 1e-9
        );
    }
}

/// Thick films are resolved by the first pass alone.
#[test]
fn test_unpadded_estimate_on_thick_film() {
    let (lambdas, intensities, n) = film(15000.0);
    let estimate =
        thickness_from_fft(&lambdas, &intensities, &n, &FftOptions::default(), None).unwrap();
    assert_relative_eq!(estimate.thickness, 15000.0, max_relative = 0.05);

    let EstimateDetails::Fft {
        optical_distance,
        grid_len,
        padding,
    } = estimate.details
    else {
        panic!("expected fft details");
    };
    assert_relative_eq!(optical_distance, 2.0 * estimate.thickness, epsilon = 1e-9);
    assert_eq!(grid_len, 20 * lambdas.len());
    assert_eq!(padding, 1);
}

/// Repeated calls give bit-identical results.
#[test]
fn test_is_deterministic() {
    let (lambdas, intensities, n) = film(4000.0);
    let first = thickness_from_fft(&lambdas, &intensities, &n, &padded(4), None).unwrap();
    let second = thickness_from_fft(&lambdas, &intensities, &n, &padded(4), None).unwrap();
    assert_eq!(first, second);
}

/// Results do not depend on whether a sink is attached.
#[test]
fn test_sink_does_not_change_result() {
    let (lambdas, intensities, n) = film(8000.0);
    let mut sink = RecordingSink::new();

    let with = thickness_from_fft(&lambdas, &intensities, &n, &padded(5), Some(&mut sink)).unwrap();
    let without = thickness_from_fft(&lambdas, &intensities, &n, &padded(5), None).unwrap();
    assert_eq!(with, without);

    assert!(sink.get("fft_input", "resampled").is_some());
    assert!(sink.get("fft", "magnitude").is_some());
    let peak = sink.get("fft", "peak").unwrap();
    assert_eq!(peak.x.len(), 1);
    assert!(sink.get("fft_padded", "magnitude").is_some());
}

/// The first pass alone emits no padded figure.
#[test]
fn test_no_padded_figure_without_padding() {
    let (lambdas, intensities, n) = film(8000.0);
    let mut sink = RecordingSink::new();
    thickness_from_fft(&lambdas, &intensities, &n, &FftOptions::default(), Some(&mut sink))
        .unwrap();
    assert!(sink.get("fft_padded", "magnitude").is_none());
}

// ============================================================================
// Resolution
// ============================================================================

/// The reported uncertainty is the bin spacing, and padding never widens it.
#[test]
fn test_padding_does_not_worsen_uncertainty() {
    let (lambdas, intensities, n) = film(5000.0);
    let coarse =
        thickness_from_fft(&lambdas, &intensities, &n, &FftOptions::default(), None).unwrap();
    let fine = thickness_from_fft(&lambdas, &intensities, &n, &padded(10), None).unwrap();

    let coarse_u = coarse.thickness_uncertainty.unwrap();
    let fine_u = fine.thickness_uncertainty.unwrap();
    assert!(coarse_u > 0.0);
    assert!(fine_u <= coarse_u);

    // Refinement succeeded: ten times finer bins.
    assert_relative_eq!(fine_u * 10.0, coarse_u, max_relative = 1e-9);
}

/// Refinement moves the estimate closer to the true thickness.
#[test]
fn test_padding_improves_accuracy() {
    let h = 7300.0;
    let (lambdas, intensities, n) = film(h);
    let coarse =
        thickness_from_fft(&lambdas, &intensities, &n, &FftOptions::default(), None).unwrap();
    let fine = thickness_from_fft(&lambdas, &intensities, &n, &padded(20), None).unwrap();

    let coarse_error = (coarse.thickness - h).abs();
    let fine_error = (fine.thickness - h).abs();
    assert!(fine_error <= coarse_error + coarse.thickness_uncertainty.unwrap() / 20.0);
}

/// A custom half space sets the grid length.
#[test]
fn test_num_half_space_sets_grid() {
    let (lambdas, intensities, n) = film(10000.0);
    let options = FftOptions {
        padding: 1,
        num_half_space: Some(4096),
    };
    let estimate = thickness_from_fft(&lambdas, &intensities, &n, &options, None).unwrap();
    let EstimateDetails::Fft { grid_len, .. } = estimate.details else {
        panic!("expected fft details");
    };
    assert_eq!(grid_len, 8192);
    assert_relative_eq!(estimate.thickness, 10000.0, max_relative = 0.05);
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_rejects_zero_padding() {
    let (lambdas, intensities, n) = film(1000.0);
    let result = thickness_from_fft(&lambdas, &intensities, &n, &padded(0), None);
    assert!(matches!(result, Err(OptifikError::InvalidParameter(_))));
}

#[test]
fn test_rejects_tiny_half_space() {
    let (lambdas, intensities, n) = film(1000.0);
    let options = FftOptions {
        padding: 1,
        num_half_space: Some(1),
    };
    let result = thickness_from_fft(&lambdas, &intensities, &n, &options, None);
    assert!(matches!(result, Err(OptifikError::InvalidParameter(_))));
}

#[test]
fn test_rejects_single_sample() {
    let result = thickness_from_fft(
        &[500.0],
        &[0.1],
        &RefractiveIndex::Constant(1.33),
        &FftOptions::default(),
        None,
    );
    assert_eq!(result, Err(OptifikError::TooFewPoints { got: 1, min: 2 }));
}

#[test]
fn test_rejects_misaligned_profile() {
    let (lambdas, intensities, _) = film(1000.0);
    let n = RefractiveIndex::Profile(vec![1.33; 10]);
    let result = thickness_from_fft(&lambdas, &intensities, &n, &FftOptions::default(), None);
    assert!(matches!(result, Err(OptifikError::LengthMismatch { .. })));
}
