//! Feature extraction modules
//!
//! This module contains the windowing and feature algorithms:
//! - Per-column energy profile and moving-average smoothing
//! - Energy-peak-centred circular window extraction
//! - Feature row derivation (real, imaginary, phase, magnitude in dB)

pub mod energy;
pub mod record;
pub mod window;
