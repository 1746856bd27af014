//! End-to-end tests: noisy spectrum, smoothing, both estimators, display
//! rounding.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use optifik::synthetic::{interference_spectrum, linspace, water_ttab_index};
use optifik::{
    round_to_uncertainty, smooth_intensities, FftOptions, MinMaxOptions, OptifikError,
    PeakOptions, RefractiveIndexModel, RoundedPair, SmoothingOptions, Spectrum,
};

fn noisy_film(h: f64, noise: f64, seed: u64) -> Spectrum {
    let lambdas = linspace(450.0, 800.0, 1000);
    let n = water_ttab_index(&lambdas);
    let mut rng = StdRng::seed_from_u64(seed);
    let intensities = interference_spectrum(h, &lambdas, &n)
        .into_iter()
        .map(|v| if noise > 0.0 { v + rng.gen_range(-noise..noise) } else { v })
        .collect();
    Spectrum::new(lambdas, intensities).unwrap()
}

#[test]
fn test_smoothed_noisy_spectrum() {
    let h = 3000.0;
    let mut spectrum = noisy_film(h, 0.003, 11);
    spectrum.intensities =
        smooth_intensities(&spectrum.intensities, &SmoothingOptions::default()).unwrap();
    let n = RefractiveIndexModel::WATER_TTAB.resolve(&spectrum.wavelengths);

    let options = MinMaxOptions {
        peaks: PeakOptions {
            min_prominence: Some(0.02),
            ..PeakOptions::default()
        },
        ..MinMaxOptions::default()
    };
    let minmax = spectrum.thickness_minmax(&n, &options).unwrap();
    assert_relative_eq!(minmax.thickness, h, max_relative = 0.02);

    let fft = spectrum
        .thickness_fft(
            &n,
            &FftOptions {
                padding: 10,
                ..FftOptions::default()
            },
        )
        .unwrap();
    assert_relative_eq!(fft.thickness, h, max_relative = 0.05);
}

#[test]
fn test_smoothing_window_longer_than_spectrum() {
    let options = SmoothingOptions {
        window_size: 11,
        poly_order: 3,
    };
    let result = smooth_intensities(&[0.1, 0.2, 0.3, 0.4, 0.5], &options);
    assert!(matches!(result, Err(OptifikError::InvalidParameter(_))));
}

#[test]
fn test_even_smoothing_window() {
    let options = SmoothingOptions {
        window_size: 10,
        poly_order: 3,
    };
    let result = smooth_intensities(&[0.0; 50], &options);
    assert!(matches!(result, Err(OptifikError::InvalidParameter(_))));
}

#[test]
fn test_estimate_rounding() {
    let spectrum = noisy_film(2000.0, 0.0, 0);
    let n = RefractiveIndexModel::WATER_TTAB.resolve(&spectrum.wavelengths);
    let estimate = spectrum
        .thickness_minmax(&n, &MinMaxOptions::default())
        .unwrap();

    let rounded = estimate.rounded(2).unwrap();
    let expected = round_to_uncertainty(
        estimate.thickness,
        estimate.thickness_uncertainty.unwrap(),
        2,
    );
    assert_eq!(rounded, expected);
    assert!(rounded.to_string().contains(" ± "));
}

#[test]
fn test_rounded_pair_display() {
    assert_eq!(
        round_to_uncertainty(1523.4567, 12.3, 1).to_string(),
        "1523 ± 10"
    );
    assert_eq!(
        round_to_uncertainty(1523.4567, 12.3, 2).to_string(),
        "1523 ± 12"
    );
    assert_eq!(
        round_to_uncertainty(1523.4567, 0.0, 2),
        RoundedPair::Unchanged {
            value: 1523.4567,
            uncertainty: 0.0
        }
    );
}
