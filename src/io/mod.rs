//! Capture I/O modules
//!
//! Binary IQ decoding, streaming sample queues and feature-table CSVs.

pub mod capture;
pub mod feature_csv;
pub mod sample_buffer;
