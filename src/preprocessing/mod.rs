//! Capture preprocessing modules
//!
//! This module contains utilities for preparing captures for analysis:
//! - Signal matrix construction from decoded samples
//! - Guard-margin trimming

pub mod guard;
pub mod matrix;
