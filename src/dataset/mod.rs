//! Dataset build pipeline
//!
//! Turns labelled capture files into per-capture chunk CSVs and one
//! combined, row-count-validated feature table, and loads that table back
//! for training and evaluation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::label::Label;

pub mod dedup;
pub mod merge;
pub mod pipeline;
pub mod purge;
pub mod split;
pub mod worker;

pub use pipeline::{build_dataset, combine_existing, DatasetSummary};
pub use worker::CancellationToken;

/// A capture on disk and its ground-truth label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFile {
    /// Raw interleaved I/Q file
    pub path: PathBuf,
    /// Interference category recorded in every row
    pub label: Label,
}

impl CaptureFile {
    /// Pair a path with its label
    pub fn new(path: impl Into<PathBuf>, label: Label) -> Self {
        Self {
            path: path.into(),
            label,
        }
    }
}
