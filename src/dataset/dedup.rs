//! Capture name de-duplication
//!
//! Chunk CSVs are named after the capture's file stem, so two captures with
//! the same stem (`radar.bin` in two directories, or `radar.bin` next to
//! `radar.dat`) would write the same chunk files. Later duplicates are
//! renamed on disk to `<stem>_<n><ext>`.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::CaptureFile;
use crate::error::{RfiError, RfiResult};

/// `<stem>_<n><ext>` next to `path`
fn suffixed(path: &Path, n: usize) -> PathBuf {
    let base = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", base, n, ext.to_string_lossy()),
        None => format!("{}_{}", base, n),
    };
    path.with_file_name(name)
}

fn stem_of(path: &Path) -> RfiResult<OsString> {
    path.file_stem().map(OsString::from).ok_or_else(|| {
        RfiError::InvalidInput(format!("capture path has no file name: {}", path.display()))
    })
}

/// Merge entries naming the same file, keeping the first position and the last label
pub fn collapse_repeated_paths(files: &[CaptureFile]) -> Vec<CaptureFile> {
    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut unique: Vec<CaptureFile> = Vec::with_capacity(files.len());

    for file in files {
        let key = std::fs::canonicalize(&file.path).unwrap_or_else(|_| file.path.clone());
        match index.get(&key) {
            Some(&slot) => {
                if unique[slot].label != file.label {
                    log::warn!(
                        "{} listed more than once; using label {}",
                        file.path.display(),
                        file.label
                    );
                }
                unique[slot].label = file.label;
            }
            None => {
                index.insert(key, unique.len());
                unique.push(file.clone());
            }
        }
    }
    unique
}

/// Rename later captures whose file stem was already seen
///
/// Repeated paths are first collapsed into one entry (last label wins). The
/// first capture with a given stem keeps its name. Each later one is moved
/// to the first `<stem>_<n><ext>` in its own directory that neither exists
/// nor matches the stem of another input, with `n` starting at 1 for the
/// first duplicate of a stem and counting up from the last suffix used.
/// Order and labels are preserved.
///
/// # Errors
///
/// `InvalidInput` for a path without a file name; `Io` if a rename fails.
pub fn rename_duplicate_basenames(files: &[CaptureFile]) -> RfiResult<Vec<CaptureFile>> {
    let files = collapse_repeated_paths(files);

    let mut taken: HashSet<OsString> = HashSet::new();
    for file in &files {
        taken.insert(stem_of(&file.path)?);
    }

    let mut seen: HashMap<OsString, usize> = HashMap::new();
    let mut updated = Vec::with_capacity(files.len());

    for file in files {
        let stem = stem_of(&file.path)?;

        let Some(&next) = seen.get(&stem) else {
            seen.insert(stem, 1);
            updated.push(file);
            continue;
        };

        let mut count = next;
        let mut target = suffixed(&file.path, count);
        while target.exists() || target.file_stem().is_some_and(|s| taken.contains(s)) {
            count += 1;
            target = suffixed(&file.path, count);
        }
        std::fs::rename(&file.path, &target).map_err(|e| RfiError::io(&file.path, e))?;
        log::info!(
            "Renamed duplicate capture {} -> {}",
            file.path.display(),
            target.display()
        );

        if let Some(new_stem) = target.file_stem() {
            taken.insert(new_stem.to_os_string());
        }
        seen.insert(stem, count + 1);
        updated.push(CaptureFile {
            path: target,
            label: file.label,
        });
    }

    Ok(updated)
}
