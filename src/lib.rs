//! # RFI DSP
//!
//! Energy-windowed ingestion of raw IQ captures for radio-frequency
//! interference classification.
//!
//! ## Features
//!
//! - **Energy windowing**: guard-trimmed, peak-centred circular column windows
//! - **Streaming classification**: FIFO sample queue reassembling arbitrary
//!   chunks into fixed-size model dispatches
//! - **Dataset build**: parallel per-capture chunk generation and a
//!   row-count-validated combined feature table
//! - **ONNX inference**: optional `ml` feature for a bundled runtime backend
//!
//! ## Quick Start
//!
//! ```no_run
//! use rfi_dsp::{extract_capture, DatasetConfig};
//!
//! let config = DatasetConfig::default();
//! let extraction = extract_capture("capture.bin", &config)?;
//!
//! println!("{} samples ({} rows x {} columns)",
//!     extraction.sample_count, extraction.rows, extraction.columns);
//! # Ok::<(), rfi_dsp::RfiError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! capture file -> SignalMatrix -> guard trim -> energy window -> feature rows
//!     -> chunk CSVs -> combined table          (dataset build)
//!     -> (1, T, 4) tensor -> model -> label    (streaming session)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod io;
pub mod ml;
pub mod preprocessing;

use std::path::Path;

// Re-export main types
pub use analysis::label::Label;
pub use analysis::metrics::{evaluate, ClassificationMetrics, Evaluation};
pub use config::{DatasetConfig, ExtractionConfig, StreamConfig, FRAME_WIDTH};
pub use dataset::{build_dataset, combine_existing, CaptureFile, DatasetSummary};
pub use error::{RfiError, RfiResult};
pub use features::record::FeatureRecord;
pub use features::window::{extract, Extraction, ExtractionWindow};
pub use io::capture::SampleFormat;
pub use ml::model::{Model, ModelInput};
pub use ml::session::ClassificationSession;
pub use preprocessing::matrix::SignalMatrix;

/// Read a capture file and window it around its energy peak
///
/// Uses `config.sample_format`, `config.max_rows` and `config.extraction`.
///
/// # Errors
///
/// `MissingResource` for an absent file, `Validation` if it holds no
/// complete frame, `InvalidInput` for unusable extraction parameters.
///
/// # Example
///
/// ```no_run
/// use rfi_dsp::{extract_capture, DatasetConfig};
///
/// let result = extract_capture("radar.bin", &DatasetConfig::default())?;
/// if let Some(window) = &result.window {
///     println!("peak at column {}", window.peak);
/// }
/// # Ok::<(), rfi_dsp::RfiError>(())
/// ```
pub fn extract_capture(path: impl AsRef<Path>, config: &DatasetConfig) -> RfiResult<Extraction> {
    use std::time::Instant;
    let start_time = Instant::now();
    let path = path.as_ref();

    config.validate()?;
    let matrix = io::capture::read_signal_matrix(path, config.sample_format, config.max_rows)?;
    let extraction = extract(&matrix, &config.extraction)?;

    log::debug!(
        "Extracted {} samples from {} in {:.2} ms",
        extraction.sample_count,
        path.display(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(extraction)
}
