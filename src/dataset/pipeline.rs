//! Dataset build orchestration
//!
//! De-duplicate capture names, purge the chunk directory, fan the captures
//! out over a bounded worker pool, then merge the chunks sequentially with
//! the row-count check. The first task failure cancels the rest and aborts
//! the build.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use super::dedup::rename_duplicate_basenames;
use super::merge::{combine_csv_files, merge_with_check};
use super::purge::purge_csv_dir;
use super::worker::{chunk_path, process_capture, CancellationToken, CaptureOutput, TaskContext};
use super::CaptureFile;
use crate::config::DatasetConfig;
use crate::error::{RfiError, RfiResult};

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Captures after de-duplication, in input order
    pub captures: Vec<CaptureFile>,
    /// Every chunk CSV, grouped by capture in input order
    pub csv_files: Vec<PathBuf>,
    /// Rows in every chunk
    ///
    /// Each capture writes chunks of its own windowed sample count and the
    /// merge requires all of them to match the first capture's, so a
    /// successful build always had one common count.
    pub sample_count: usize,
    /// Data rows in the combined table
    pub rows_written: usize,
}

/// Build the combined feature table from labelled captures
///
/// # Errors
///
/// Precondition failures (`InvalidInput`, `MissingResource`, `Validation`
/// from the purge) are returned directly. A failed capture task aborts the
/// build with `BuildAborted`, carrying the chunk files already written. A
/// chunk with the wrong row count fails the merge with `Validation` and
/// leaves no combined file.
pub fn build_dataset(
    files: &[CaptureFile],
    output_dir: impl AsRef<Path>,
    combined_output: impl AsRef<Path>,
    config: &DatasetConfig,
) -> RfiResult<DatasetSummary> {
    let output_dir = output_dir.as_ref();
    let combined_output = combined_output.as_ref();
    config.validate()?;
    if files.is_empty() {
        return Err(RfiError::InvalidInput("no capture files given".to_string()));
    }

    let captures = rename_duplicate_basenames(files)?;
    purge_csv_dir(output_dir)?;

    let workers = config.worker_count();
    log::info!("Building dataset: {} captures, {} workers", captures.len(), workers);
    let t0 = Instant::now();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
    let token = CancellationToken::new();
    let timeout = config.task_timeout();

    let results: Vec<RfiResult<CaptureOutput>> = pool.install(|| {
        captures
            .par_iter()
            .map(|capture| {
                let ctx = TaskContext::new(token.clone(), timeout);
                let result = process_capture(capture, output_dir, config, &ctx);
                if let Err(e) = &result {
                    if !matches!(e, RfiError::Cancelled(_)) {
                        log::error!("{}: {}", capture.path.display(), e);
                        token.cancel();
                    }
                }
                result
            })
            .collect()
    });
    log::debug!("Capture tasks finished in {:.1?}", t0.elapsed());

    let outputs = join_results(results)?;

    let csv_files: Vec<PathBuf> = outputs
        .iter()
        .flat_map(|o| o.csv_files.iter().cloned())
        .collect();
    if csv_files.is_empty() {
        return Err(RfiError::MissingResource(output_dir.to_path_buf()));
    }

    let (sample_count, _consistent) = authoritative_sample_count(&outputs);
    let rows_written = merge_with_check(&csv_files, combined_output, sample_count)?;
    log::info!(
        "Dataset ready: {} rows from {} chunks in {:.1?}",
        rows_written,
        csv_files.len(),
        t0.elapsed()
    );

    Ok(DatasetSummary {
        captures,
        csv_files,
        sample_count,
        rows_written,
    })
}

/// Row count every chunk must match, and whether all captures agreed on it
///
/// The first capture's count is authoritative. Disagreement is logged as a
/// warning, not an error; the merge then rejects the chunks that differ.
pub fn authoritative_sample_count(outputs: &[CaptureOutput]) -> (usize, bool) {
    let Some(first) = outputs.first() else {
        return (0, true);
    };
    let sample_count = first.sample_count;
    let consistent = outputs.iter().all(|o| o.sample_count == sample_count);
    if !consistent {
        let counts: Vec<usize> = outputs.iter().map(|o| o.sample_count).collect();
        log::warn!(
            "Captures produced different sample counts after windowing {:?}; using {}",
            counts,
            sample_count
        );
    }
    (sample_count, consistent)
}

/// Inspect the per-task results at the join point
///
/// All successes pass through in input order. Otherwise the first failure
/// that is not a cancellation (or the first cancellation, if that is all
/// there is) becomes the cause of a `BuildAborted`.
pub fn join_results(results: Vec<RfiResult<CaptureOutput>>) -> RfiResult<Vec<CaptureOutput>> {
    let mut outputs = Vec::with_capacity(results.len());
    let mut cause: Option<RfiError> = None;

    for result in results {
        match result {
            Ok(out) => outputs.push(out),
            Err(e) => {
                let replace = match &cause {
                    None => true,
                    Some(RfiError::Cancelled(_)) => !matches!(e, RfiError::Cancelled(_)),
                    Some(_) => false,
                };
                if replace {
                    cause = Some(e);
                }
            }
        }
    }

    match cause {
        None => Ok(outputs),
        Some(cause) => {
            let partial_files: Vec<PathBuf> = outputs.into_iter().flat_map(|o| o.csv_files).collect();
            log::error!(
                "Dataset build aborted with {} chunk files written: {}",
                partial_files.len(),
                cause
            );
            Err(RfiError::BuildAborted {
                cause: Box::new(cause),
                partial_files,
            })
        }
    }
}

/// Re-combine chunk CSVs from an earlier build without regenerating them
///
/// Looks for `<stem>_<k>.csv`, `k` in `1..=num_files_per_capture`, for
/// every capture (after the same name de-duplication as a build). Returns
/// the number of data rows written.
///
/// # Errors
///
/// `MissingResource` if no chunk file exists.
pub fn combine_existing(
    files: &[CaptureFile],
    num_files_per_capture: usize,
    output_dir: impl AsRef<Path>,
    combined_output: impl AsRef<Path>,
) -> RfiResult<usize> {
    let output_dir = output_dir.as_ref();
    let captures = rename_duplicate_basenames(files)?;

    let csv_files: Vec<PathBuf> = captures
        .iter()
        .flat_map(|c| (1..=num_files_per_capture).map(move |k| chunk_path(output_dir, &c.path, k)))
        .filter(|p| p.exists())
        .collect();
    if csv_files.is_empty() {
        return Err(RfiError::MissingResource(output_dir.to_path_buf()));
    }

    log::info!("Re-combining {} existing chunk files", csv_files.len());
    combine_csv_files(&csv_files, combined_output.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(name: &str, n: usize) -> CaptureOutput {
        CaptureOutput {
            csv_files: vec![PathBuf::from(name)],
            sample_count: n,
        }
    }

    #[test]
    fn test_join_all_ok() {
        let out = join_results(vec![Ok(output("a_1.csv", 5)), Ok(output("b_1.csv", 5))]).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].csv_files[0], PathBuf::from("b_1.csv"));
    }

    #[test]
    fn test_join_reports_real_cause_over_cancellation() {
        let results = vec![
            Err(RfiError::Cancelled(PathBuf::from("a.bin"))),
            Ok(output("b_1.csv", 5)),
            Err(RfiError::Validation("c.bin: no complete frame".to_string())),
            Err(RfiError::Validation("d.bin: no complete frame".to_string())),
        ];
        match join_results(results) {
            Err(RfiError::BuildAborted { cause, partial_files }) => {
                assert!(cause.to_string().contains("c.bin"));
                assert_eq!(partial_files, vec![PathBuf::from("b_1.csv")]);
            }
            other => panic!("expected BuildAborted, got {:?}", other),
        }
    }

    #[test]
    fn test_first_capture_count_is_authoritative() {
        let same = [output("a_1.csv", 600), output("b_1.csv", 600)];
        assert_eq!(authoritative_sample_count(&same), (600, true));

        let mixed = [output("a_1.csv", 600), output("b_1.csv", 1200), output("c_1.csv", 600)];
        assert_eq!(authoritative_sample_count(&mixed), (600, false));

        let reversed = [output("b_1.csv", 1200), output("a_1.csv", 600)];
        assert_eq!(authoritative_sample_count(&reversed), (1200, false));
    }

    #[test]
    fn test_join_only_cancellations() {
        let results = vec![Err(RfiError::Cancelled(PathBuf::from("a.bin")))];
        match join_results(results) {
            Err(RfiError::BuildAborted { cause, .. }) => {
                assert!(matches!(*cause, RfiError::Cancelled(_)))
            }
            other => panic!("expected BuildAborted, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_dataset(&[], dir.path(), dir.path().join("c.csv"), &DatasetConfig::default())
            .unwrap_err();
        assert!(matches!(err, RfiError::InvalidInput(_)));
    }

    #[test]
    fn test_combine_existing_missing_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![CaptureFile::new(dir.path().join("x.bin"), crate::Label::Radar)];
        let err = combine_existing(&files, 2, dir.path(), dir.path().join("c.csv")).unwrap_err();
        assert!(matches!(err, RfiError::MissingResource(_)));
    }
}
