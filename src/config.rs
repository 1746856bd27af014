//! Analysis settings, readable from a JSON file.
//!
//! ```json
//! {
//!   "load": { "wavelength_min": 450 },
//!   "refractive_index": { "model": "constant", "value": 1.33 },
//!   "minmax": { "method": "ransac", "peaks": { "min_prominence": 0.02 } }
//! }
//! ```
//!
//! Every key is optional; missing ones take the defaults of the
//! corresponding options struct.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;
use crate::data::model::RefractiveIndexModel;
use crate::error::{OptifikError, Result};
use crate::estimate::{FftOptions, MinMaxOptions};
use crate::signal::SmoothingOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub load: LoadOptions,
    /// `None` runs the estimators on the raw intensities.
    pub smoothing: Option<SmoothingOptions>,
    pub refractive_index: RefractiveIndexModel,
    pub fft: FftOptions,
    pub minmax: MinMaxOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            smoothing: Some(SmoothingOptions::default()),
            refractive_index: RefractiveIndexModel::default(),
            fft: FftOptions::default(),
            minmax: MinMaxOptions::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| OptifikError::invalid(format!("analysis config: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| OptifikError::Load(format!("reading {}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }
}
