//! Feature derivation: complex samples to labelled feature rows

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::analysis::label::Label;

/// Number of model input channels per time step
pub const FEATURE_CHANNELS: usize = 4;

/// One feature row per complex sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// In-phase component
    #[serde(rename = "Real")]
    pub real: f64,
    /// Quadrature component
    #[serde(rename = "Imaginary")]
    pub imag: f64,
    /// `atan2(imag, real)`, radians in [-π, π]
    #[serde(rename = "Phase")]
    pub phase: f64,
    /// `20·log10|x|`, 0 for a zero sample
    #[serde(rename = "Magnitude")]
    pub magnitude_db: f64,
    /// Ground-truth label
    #[serde(rename = "Labels")]
    pub label: Label,
}

impl FeatureRecord {
    /// Derive the feature row for one sample
    pub fn from_sample(sample: Complex64, label: Label) -> Self {
        Self {
            real: sample.re,
            imag: sample.im,
            phase: sample.im.atan2(sample.re),
            magnitude_db: magnitude_db(sample),
            label,
        }
    }

    /// Channels in model order: `[real, imag, phase, magnitude_dB]`
    pub fn channels(&self) -> [f32; FEATURE_CHANNELS] {
        [
            self.real as f32,
            self.imag as f32,
            self.phase as f32,
            self.magnitude_db as f32,
        ]
    }
}

/// Magnitude in dB; a zero sample (log of zero) maps to 0
pub fn magnitude_db(sample: Complex64) -> f64 {
    let db = 20.0 * sample.norm().log10();
    if db == f64::NEG_INFINITY {
        0.0
    } else {
        db
    }
}

/// Derive labelled feature rows for every sample, preserving order
pub fn derive_records(samples: &[Complex64], label: Label) -> Vec<FeatureRecord> {
    log::debug!("Deriving {} feature records ({})", samples.len(), label);
    samples
        .iter()
        .map(|&s| FeatureRecord::from_sample(s, label))
        .collect()
}

/// Model input rows `[real, imag, phase, magnitude_dB]`, one per sample
pub fn feature_matrix(samples: &[Complex64]) -> Vec<[f32; FEATURE_CHANNELS]> {
    samples
        .iter()
        .map(|&s| FeatureRecord::from_sample(s, Label::Undefined).channels())
        .collect()
}
