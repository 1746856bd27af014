use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use argh::FromArgs;

use optifik::diagnostics::{DiagnosticSink, Series, SeriesKind};
use optifik::{
    load_spectrum, smooth_intensities, thickness_from_fft, thickness_from_minmax, AnalysisConfig,
    RecordingSink, RefractiveIndexModel, RegressionMethod, ThicknessEstimate,
};

/** optifik
Estimate the thickness of a thin film from its interference spectrum
*/
#[derive(FromArgs)]
struct Opts {
    /// spectrum file: .xy, .csv, .txt (two columns) or .json
    #[argh(positional)]
    spectrum: PathBuf,

    /// analysis settings as JSON; command line flags override them
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// estimator to run: fft, minmax or both, default: both
    #[argh(option, short = 'm', default = "Method::Both")]
    method: Method,

    /// zero-padding factor of the FFT refinement
    #[argh(option, short = 'p')]
    padding: Option<usize>,

    /// minimum prominence of the extrema used by minmax
    #[argh(option)]
    prominence: Option<f64>,

    /// line fit used by minmax: linreg or ransac
    #[argh(option, short = 'r')]
    regression: Option<RegressionMethod>,

    /// constant refractive index, replacing the configured model
    #[argh(option, short = 'n')]
    index: Option<f64>,

    /// skip Savitzky-Golay smoothing
    #[argh(switch)]
    no_smooth: bool,

    /// write the intermediate curves to this JSON file
    #[argh(option)]
    diagnostics: Option<PathBuf>,

    /// significant digits kept in the uncertainty, default: 1
    #[argh(option, short = 'd', default = "1")]
    digits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Fft,
    MinMax,
    Both,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fft" => Ok(Method::Fft),
            "minmax" => Ok(Method::MinMax),
            "both" => Ok(Method::Both),
            other => Err(format!("unknown method '{other}' (expected fft, minmax or both)")),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = argh::from_env();

    let config = build_config(&opts)?;

    let mut spectrum = load_spectrum(&opts.spectrum, &config.load)
        .with_context(|| format!("Failed to load {}", opts.spectrum.display()))?;
    log::info!(
        "loaded {} samples from {}",
        spectrum.len(),
        opts.spectrum.display()
    );

    let mut recorder = RecordingSink::new();
    if let Some(smoothing) = &config.smoothing {
        let smoothed = smooth_intensities(&spectrum.intensities, smoothing)
            .context("Failed to smooth the spectrum")?;
        if opts.diagnostics.is_some() {
            for (name, y) in [("raw", &spectrum.intensities), ("smoothed", &smoothed)] {
                recorder.emit(Series {
                    figure: "spectrum",
                    name,
                    kind: SeriesKind::Curve,
                    x: &spectrum.wavelengths,
                    y,
                });
            }
        }
        spectrum.intensities = smoothed;
    }

    let n = config.refractive_index.resolve(&spectrum.wavelengths);

    if matches!(opts.method, Method::Fft | Method::Both) {
        let estimate = thickness_from_fft(
            &spectrum.wavelengths,
            &spectrum.intensities,
            &n,
            &config.fft,
            Some(&mut recorder),
        )
        .context("FFT estimate failed")?;
        report("fft", &estimate, opts.digits);
    }

    if matches!(opts.method, Method::MinMax | Method::Both) {
        let estimate = thickness_from_minmax(
            &spectrum.wavelengths,
            &spectrum.intensities,
            &n,
            &config.minmax,
            Some(&mut recorder),
        )
        .context("minmax estimate failed")?;
        report(
            &format!("minmax/{}", config.minmax.method),
            &estimate,
            opts.digits,
        );
    }

    if let Some(path) = &opts.diagnostics {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &recorder)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("wrote {} diagnostic series to {}", recorder.series.len(), path.display());
    }

    Ok(())
}

/// Config file first, then command line overrides.
fn build_config(opts: &Opts) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &opts.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(padding) = opts.padding {
        if padding == 0 {
            bail!("--padding must be at least 1");
        }
        config.fft.padding = padding;
    }
    if let Some(prominence) = opts.prominence {
        config.minmax.peaks.min_prominence = Some(prominence);
    }
    if let Some(method) = opts.regression {
        config.minmax.method = method;
    }
    if let Some(value) = opts.index {
        config.refractive_index = RefractiveIndexModel::Constant { value };
    }
    if opts.no_smooth {
        config.smoothing = None;
    }
    Ok(config)
}

fn report(label: &str, estimate: &ThicknessEstimate, digits: u32) {
    if !estimate.is_valid() {
        println!("{label}: no estimate (see warnings)");
        return;
    }
    match estimate.rounded(digits) {
        Some(rounded) => println!("{label}: h = {rounded} nm"),
        None => println!("{label}: h = {} nm", estimate.thickness),
    }
}
