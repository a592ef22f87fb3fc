//! Feature-table CSV files
//!
//! Per-chunk files carry `Real,Imaginary,Phase,Magnitude,Labels`; the
//! combined table prefixes every row with a `File` provenance column.

use std::path::Path;

use crate::error::{RfiError, RfiResult};
use crate::features::record::FeatureRecord;

/// Columns of a per-chunk CSV
pub const CHUNK_COLUMNS: [&str; 5] = ["Real", "Imaginary", "Phase", "Magnitude", "Labels"];

/// Provenance column added when chunks are merged
pub const FILE_COLUMN: &str = "File";

/// Write feature rows to a chunk CSV, returning the number of rows written
pub fn write_chunk(path: impl AsRef<Path>, records: &[FeatureRecord]) -> RfiResult<usize> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(CHUNK_COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| RfiError::io(path, e))?;
    log::debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(records.len())
}

/// Read every row of a chunk CSV
pub fn read_chunk(path: impl AsRef<Path>) -> RfiResult<Vec<FeatureRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RfiError::MissingResource(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<FeatureRecord>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Position of every requested column in a header row
///
/// # Errors
///
/// Returns `Validation` naming the first missing column.
pub fn column_indices<const N: usize>(
    headers: &csv::StringRecord,
    wanted: [&str; N],
) -> RfiResult<[usize; N]> {
    let mut out = [0usize; N];
    for (slot, name) in out.iter_mut().zip(wanted) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RfiError::Validation(format!("missing required column '{}'", name)))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::label::Label;
    use num_complex::Complex64;

    #[test]
    fn test_chunk_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture_1.csv");
        let records = vec![
            FeatureRecord::from_sample(Complex64::new(3.0, 4.0), Label::Radar),
            FeatureRecord::from_sample(Complex64::new(0.0, 0.0), Label::Radar),
        ];
        assert_eq!(write_chunk(&path, &records).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Real,Imaginary,Phase,Magnitude,Labels"));
        assert!(lines.next().unwrap().ends_with(",2"));

        let back = read_chunk(&path).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_empty_chunk_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty_1.csv");
        write_chunk(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), "Real,Imaginary,Phase,Magnitude,Labels");
    }

    #[test]
    fn test_column_indices() {
        let headers = csv::StringRecord::from(vec!["File", "Real", "Labels"]);
        assert_eq!(column_indices(&headers, ["Labels", "File"]).unwrap(), [2, 0]);
        let err = column_indices(&headers, ["Phase"]).unwrap_err();
        assert!(err.to_string().contains("Phase"));
    }
}
