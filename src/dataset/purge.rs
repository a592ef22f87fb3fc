//! Output directory preparation

use std::path::Path;

use crate::error::{RfiError, RfiResult};

fn is_csv(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "csv")
}

/// Delete every `.csv` file in `dir`, returning how many were removed
///
/// Nothing is deleted unless the directory holds only CSV files.
///
/// # Errors
///
/// `MissingResource` if `dir` does not exist; `Validation` listing the
/// offending entries if anything other than a `.csv` file is present.
pub fn purge_csv_dir(dir: impl AsRef<Path>) -> RfiResult<usize> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(RfiError::MissingResource(dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| RfiError::io(dir, e))? {
        let entry = entry.map_err(|e| RfiError::io(dir, e))?;
        entries.push(entry.path());
    }

    let foreign: Vec<String> = entries
        .iter()
        .filter(|p| !is_csv(p))
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    if !foreign.is_empty() {
        return Err(RfiError::Validation(format!(
            "non-CSV files found in {}: {:?}",
            dir.display(),
            foreign
        )));
    }

    for path in &entries {
        std::fs::remove_file(path).map_err(|e| RfiError::io(path, e))?;
    }
    log::debug!("Deleted {} CSV files in {}", entries.len(), dir.display());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_1.csv"), "Real\n").unwrap();
        std::fs::write(dir.path().join("b_1.csv"), "Real\n").unwrap();
        assert_eq!(purge_csv_dir(dir.path()).unwrap(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_foreign_file_is_fatal_and_nothing_deleted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_1.csv"), "Real\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let err = purge_csv_dir(dir.path()).unwrap_err();
        assert!(matches!(err, RfiError::Validation(_)));
        assert!(err.to_string().contains("notes.txt"));
        assert!(dir.path().join("a_1.csv").exists());
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            purge_csv_dir(&missing),
            Err(RfiError::MissingResource(_))
        ));
    }
}
