//! Per-capture dataset task
//!
//! Reads one capture, windows it around its energy peak, derives feature
//! rows and writes them as `<stem>_<k>.csv` chunks of exactly
//! `sample_count` rows. Each task only touches its own input file and its
//! own output files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::CaptureFile;
use crate::config::DatasetConfig;
use crate::error::{RfiError, RfiResult};
use crate::features::record::{derive_records, FeatureRecord};
use crate::features::window::extract;
use crate::io::capture::read_signal_matrix;
use crate::io::feature_csv::write_chunk;

/// Pool-wide cancellation flag shared by every task of a build
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every task holding a clone to stop at its next checkpoint
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cancellation and deadline state for one task
#[derive(Debug, Clone)]
pub struct TaskContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
    started: Instant,
}

impl TaskContext {
    /// Start the task clock now
    pub fn new(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            cancel,
            timeout,
            started: Instant::now(),
        }
    }

    /// Fail if the build was cancelled or this task ran past its deadline
    pub fn checkpoint(&self, path: &Path) -> RfiResult<()> {
        if self.cancel.is_cancelled() {
            return Err(RfiError::Cancelled(path.to_path_buf()));
        }
        let elapsed = self.started.elapsed();
        if let Some(limit) = self.timeout {
            if elapsed > limit {
                return Err(RfiError::TaskTimeout {
                    path: path.to_path_buf(),
                    elapsed,
                });
            }
        }
        Ok(())
    }
}

/// Files produced by one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutput {
    /// Chunk CSVs in chunk order
    pub csv_files: Vec<PathBuf>,
    /// Rows per chunk, as reported by the extractor
    pub sample_count: usize,
}

/// Contiguous chunks of exactly `size` rows, at most `max_chunks` of them
///
/// Rows past the last full chunk are dropped.
pub fn split_chunks(records: &[FeatureRecord], size: usize, max_chunks: usize) -> Vec<&[FeatureRecord]> {
    if size == 0 {
        return Vec::new();
    }
    records.chunks_exact(size).take(max_chunks).collect()
}

/// `<output_dir>/<stem>_<k>.csv`
pub fn chunk_path(output_dir: &Path, capture: &Path, k: usize) -> PathBuf {
    let stem = capture
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}_{}.csv", stem, k))
}

/// Turn one capture into its chunk CSVs
///
/// # Errors
///
/// `MissingResource`/`Io` from reading, `Validation` if the capture holds
/// no complete frame, `Cancelled` or `TaskTimeout` at any checkpoint.
pub fn process_capture(
    capture: &CaptureFile,
    output_dir: &Path,
    config: &DatasetConfig,
    ctx: &TaskContext,
) -> RfiResult<CaptureOutput> {
    let path = capture.path.as_path();
    ctx.checkpoint(path)?;

    let matrix = read_signal_matrix(path, config.sample_format, config.max_rows)?;
    log::debug!(
        "{}: read {} frames of {} samples",
        path.display(),
        matrix.rows(),
        matrix.cols()
    );
    ctx.checkpoint(path)?;

    let extraction = extract(&matrix, &config.extraction)?;
    let records = derive_records(&extraction.samples, capture.label);
    ctx.checkpoint(path)?;

    let chunks = split_chunks(&records, extraction.sample_count, config.num_files_per_capture);
    let mut csv_files = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let out = chunk_path(output_dir, path, i + 1);
        write_chunk(&out, chunk)?;
        csv_files.push(out);
    }

    log::info!(
        "{}: {} chunk(s) of {} rows ({})",
        path.display(),
        csv_files.len(),
        extraction.sample_count,
        capture.label
    );
    Ok(CaptureOutput {
        csv_files,
        sample_count: extraction.sample_count,
    })
}
