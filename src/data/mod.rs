/// Data layer: spectrum types, refractive index, and file loading.
///
/// Architecture:
/// ```text
///  .xy / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, crop to wavelength window → Spectrum
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────────────┐
///   │ Spectrum + RefractiveIndex    │  aligned per-sample inputs
///   └──────────────────────────────┘
///        │
///        ▼
///   signal / estimate modules
/// ```

pub mod loader;
pub mod model;
