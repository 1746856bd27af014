use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use argh::FromArgs;
use rand::rngs::StdRng;
use rand::SeedableRng;

use optifik::synthetic::{add_gaussian_noise, interference_spectrum, linspace};
use optifik::RefractiveIndexModel;

/** generate_sample
Write a synthetic thin-film spectrum as a two-column .xy file
*/
#[derive(FromArgs)]
struct Opts {
    /// film thickness in nm, default: 1500
    #[argh(option, short = 't', default = "1500.0")]
    thickness: f64,

    /// shortest wavelength in nm, default: 450
    #[argh(option, default = "450.0")]
    lambda_min: f64,

    /// longest wavelength in nm, default: 800
    #[argh(option, default = "800.0")]
    lambda_max: f64,

    /// number of samples, default: 1000
    #[argh(option, short = 'n', default = "1000")]
    samples: usize,

    /// standard deviation of the added gaussian noise, default: 0.01
    #[argh(option, default = "0.01")]
    noise: f64,

    /// random seed, default: 42
    #[argh(option, default = "42")]
    seed: u64,

    /// output path, default: sample_spectrum.xy
    #[argh(option, short = 'o', default = "PathBuf::from(\"sample_spectrum.xy\")")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = argh::from_env();

    if opts.samples < 2 {
        bail!("need at least 2 samples, got {}", opts.samples);
    }
    if !(opts.lambda_min > 0.0 && opts.lambda_min < opts.lambda_max) {
        bail!(
            "invalid wavelength range {}..{}",
            opts.lambda_min,
            opts.lambda_max
        );
    }

    let wavelengths = linspace(opts.lambda_min, opts.lambda_max, opts.samples);
    let n = RefractiveIndexModel::WATER_TTAB.resolve(&wavelengths);
    let n_values = n.values(wavelengths.len());

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut intensities = interference_spectrum(opts.thickness, &wavelengths, &n_values);
    add_gaussian_noise(&mut intensities, opts.noise, &mut rng)
        .with_context(|| format!("invalid noise level {}", opts.noise))?;

    let file = File::create(&opts.output)
        .with_context(|| format!("Failed to create {}", opts.output.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# synthetic film, h = {} nm, noise = {}", opts.thickness, opts.noise)?;
    for (lambda, intensity) in wavelengths.iter().zip(&intensities) {
        writeln!(out, "{lambda:.4},{intensity:.6}")?;
    }
    out.flush()
        .with_context(|| format!("Failed to write {}", opts.output.display()))?;

    println!(
        "Wrote {} samples ({} nm film) to {}",
        opts.samples,
        opts.thickness,
        opts.output.display()
    );
    Ok(())
}
