//! Labels and classification scoring

pub mod label;
pub mod metrics;
