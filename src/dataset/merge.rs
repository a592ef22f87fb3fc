//! Chunk merging into the combined feature table
//!
//! The combined table is written to `<output>.partial` and only renamed to
//! `<output>` once every chunk has been accepted. Any failure removes the
//! partial file, so a combined CSV on disk is always complete.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{RfiError, RfiResult};
use crate::io::feature_csv::FILE_COLUMN;

/// `<output>.partial`
pub fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// Merge chunks, requiring exactly `expected_rows` data rows in each
///
/// Every output row is prefixed with the chunk's file name in a `File`
/// column. A chunk whose file name was already merged is skipped with a
/// warning. Returns the number of data rows written.
///
/// # Errors
///
/// `MissingResource` for an absent chunk; `Validation` for an empty chunk,
/// a header differing from the first chunk's, or a row count other than
/// `expected_rows`. No file is left at `output` on error.
pub fn merge_with_check(csv_files: &[PathBuf], output: &Path, expected_rows: usize) -> RfiResult<usize> {
    log::info!("Merging {} chunk files into {}", csv_files.len(), output.display());
    merge_atomic(csv_files, output, Some(expected_rows))
}

/// Merge chunks without the per-chunk row count check
///
/// # Errors
///
/// `Validation` if `csv_files` is empty, otherwise as [`merge_with_check`].
pub fn combine_csv_files(csv_files: &[PathBuf], output: &Path) -> RfiResult<usize> {
    if csv_files.is_empty() {
        return Err(RfiError::Validation("no CSV files to combine".to_string()));
    }
    merge_atomic(csv_files, output, None)
}

fn merge_atomic(csv_files: &[PathBuf], output: &Path, expected_rows: Option<usize>) -> RfiResult<usize> {
    let partial = partial_path(output);
    match merge_into(csv_files, &partial, expected_rows) {
        Ok(rows) => {
            std::fs::rename(&partial, output).map_err(|e| RfiError::io(output, e))?;
            log::info!("Wrote {} rows to {}", rows, output.display());
            Ok(rows)
        }
        Err(e) => {
            if partial.exists() {
                if let Err(rm) = std::fs::remove_file(&partial) {
                    log::warn!("Could not remove {}: {}", partial.display(), rm);
                }
            }
            Err(e)
        }
    }
}

fn merge_into(csv_files: &[PathBuf], target: &Path, expected_rows: Option<usize>) -> RfiResult<usize> {
    let file = File::create(target).map_err(|e| RfiError::io(target, e))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut seen: HashSet<OsString> = HashSet::new();
    let mut header: Option<csv::StringRecord> = None;
    let mut total = 0usize;

    for path in csv_files {
        if !path.exists() {
            return Err(RfiError::MissingResource(path.clone()));
        }
        let Some(name) = path.file_name().map(OsString::from) else {
            return Err(RfiError::InvalidInput(format!(
                "chunk path has no file name: {}",
                path.display()
            )));
        };
        if !seen.insert(name.clone()) {
            log::warn!(
                "Duplicate chunk name '{}', skipping {}",
                name.to_string_lossy(),
                path.display()
            );
            continue;
        }
        let base = name.to_string_lossy();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        let mut records = reader.records();

        let file_header = match records.next() {
            Some(h) => h?,
            None => {
                return Err(RfiError::Validation(format!(
                    "chunk file {} is empty",
                    path.display()
                )))
            }
        };
        if let Some(first) = header.as_ref() {
            if *first != file_header {
                return Err(RfiError::Validation(format!(
                    "chunk file {} has header {:?}, expected {:?}",
                    path.display(),
                    file_header,
                    first
                )));
            }
        } else {
            let mut row = csv::StringRecord::new();
            row.push_field(FILE_COLUMN);
            row.extend(file_header.iter());
            writer.write_record(&row)?;
            header = Some(file_header);
        }

        let mut count = 0usize;
        for record in records {
            let record = record?;
            let mut row = csv::StringRecord::new();
            row.push_field(&base);
            row.extend(record.iter());
            writer.write_record(&row)?;
            count += 1;
        }

        if let Some(expected) = expected_rows {
            if count != expected {
                return Err(RfiError::Validation(format!(
                    "chunk file {} contains {} samples instead of {}",
                    path.display(),
                    count,
                    expected
                )));
            }
        }
        total += count;
    }

    writer.flush().map_err(|e| RfiError::io(target, e))?;
    Ok(total)
}
