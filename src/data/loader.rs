use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::model::Spectrum;
use crate::error::{OptifikError, Result};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Wavelength window and column delimiter used when reading a spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Samples below this wavelength (nm) are dropped; the bound is kept.
    pub wavelength_min: f64,
    /// Samples above this wavelength (nm) are dropped; the bound is kept.
    pub wavelength_max: f64,
    /// Column separator for delimited text files.
    pub delimiter: char,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            wavelength_min: 0.0,
            wavelength_max: f64::INFINITY,
            delimiter: ',',
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a spectrum from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "wavelengths": [...], "intensities": [...] }`
/// * anything else (`.xy`, `.csv`, `.txt`) – two delimited columns,
///   wavelength then intensity, `#` starting a comment line
///
/// The result is cropped to `[wavelength_min, wavelength_max]`.
pub fn load_spectrum(path: &Path, options: &LoadOptions) -> Result<Spectrum> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let spectrum = match ext.as_str() {
        "json" => load_json(path)?,
        _ => load_columns(path, options.delimiter)?,
    };

    let cropped = spectrum.crop(options.wavelength_min, options.wavelength_max);
    log::debug!(
        "loaded {} samples from {}, {} kept in [{}, {}] nm",
        spectrum.len(),
        path.display(),
        cropped.len(),
        options.wavelength_min,
        options.wavelength_max
    );
    Ok(cropped)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Layout: no header row, first column wavelength (nm), second column
/// intensity. Extra columns are ignored.
fn load_columns(path: &Path, delimiter: char) -> Result<Spectrum> {
    if !delimiter.is_ascii() {
        return Err(OptifikError::invalid(format!(
            "delimiter {delimiter:?} is not an ASCII character"
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter as u8)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| OptifikError::Load(format!("opening {}: {e}", path.display())))?;

    let mut wavelengths = Vec::new();
    let mut intensities = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| OptifikError::Load(format!("row {row_no}: {e}")))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if record.len() < 2 {
            return Err(OptifikError::Load(format!(
                "row {row_no}: expected 2 columns, found {}",
                record.len()
            )));
        }
        wavelengths.push(parse_cell(&record[0], row_no, "wavelength")?);
        intensities.push(parse_cell(&record[1], row_no, "intensity")?);
    }

    validated(path, wavelengths, intensities)
}

/// [`Spectrum::new`], with failures reported as load errors on `path`.
fn validated(path: &Path, wavelengths: Vec<f64>, intensities: Vec<f64>) -> Result<Spectrum> {
    Spectrum::new(wavelengths, intensities)
        .map_err(|e| OptifikError::Load(format!("{}: {e}", path.display())))
}

fn parse_cell(s: &str, row: usize, col: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|_| OptifikError::Load(format!("row {row}, {col}: '{s}' is not a number")))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// { "wavelengths": [450.0, 450.5, ...], "intensities": [0.12, 0.14, ...] }
/// ```
fn load_json(path: &Path) -> Result<Spectrum> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| OptifikError::Load(format!("reading {}: {e}", path.display())))?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| OptifikError::Load(format!("parsing JSON: {e}")))?;

    let obj = root
        .as_object()
        .ok_or_else(|| OptifikError::Load("expected a top-level JSON object".into()))?;

    let wavelengths = json_array_to_f64(obj.get("wavelengths"), "wavelengths")?;
    let intensities = json_array_to_f64(obj.get("intensities"), "intensities")?;

    if wavelengths.len() != intensities.len() {
        return Err(OptifikError::Load(format!(
            "wavelengths has {} values but intensities has {}",
            wavelengths.len(),
            intensities.len()
        )));
    }

    validated(path, wavelengths, intensities)
}

fn json_array_to_f64(val: Option<&JsonValue>, key: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .ok_or_else(|| OptifikError::Load(format!("missing or invalid '{key}' array")))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| {
            v.as_f64()
                .ok_or_else(|| OptifikError::Load(format!("{key}[{j}]: not a number")))
        })
        .collect()
}
