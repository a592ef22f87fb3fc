//! Combined-table loading and train/test splitting

use std::collections::HashMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::analysis::label::Label;
use crate::error::{RfiError, RfiResult};
use crate::features::record::FEATURE_CHANNELS;
use crate::io::feature_csv::{column_indices, FILE_COLUMN};

/// Default shuffle seed for [`train_test_split`]
pub const RANDOM_STATE: u64 = 11;

/// One chunk's feature series with its ground-truth label
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    /// Chunk file name from the `File` column
    pub file: String,
    /// `(time_steps, 4)` rows: `[real, imag, phase, magnitude_dB]`
    pub features: Vec<[f32; FEATURE_CHANNELS]>,
    /// Label of the chunk's first row
    pub label: Label,
}

fn parse_field<T: std::str::FromStr>(value: &str, column: &str, line: u64) -> RfiResult<T> {
    value.trim().parse().map_err(|_| {
        RfiError::Validation(format!(
            "line {}: cannot parse '{}' in column {}",
            line, value, column
        ))
    })
}

/// Load a combined table and group its rows into one series per `File`
///
/// Groups keep the order in which each file first appears.
///
/// # Errors
///
/// `MissingResource` for an absent file; `Validation` for a missing
/// column, an unparsable value, an unknown label id, an empty table or
/// series of unequal length.
pub fn load_series(path: impl AsRef<Path>) -> RfiResult<Vec<LabeledSeries>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RfiError::MissingResource(path.to_path_buf()));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let [file_i, re_i, im_i, ph_i, mag_i, label_i] = column_indices(
        &headers,
        [FILE_COLUMN, "Real", "Imaginary", "Phase", "Magnitude", "Labels"],
    )?;

    let mut series: Vec<LabeledSeries> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |i: usize| record.get(i).unwrap_or_default();

        let row = [
            parse_field::<f32>(field(re_i), "Real", line)?,
            parse_field::<f32>(field(im_i), "Imaginary", line)?,
            parse_field::<f32>(field(ph_i), "Phase", line)?,
            parse_field::<f32>(field(mag_i), "Magnitude", line)?,
        ];

        let file = field(file_i);
        let slot = match index.get(file) {
            Some(&slot) => slot,
            None => {
                let id: i64 = parse_field(field(label_i), "Labels", line)?;
                let label = Label::from_id(id).ok_or_else(|| {
                    RfiError::Validation(format!("line {}: unknown label id {}", line, id))
                })?;
                index.insert(file.to_string(), series.len());
                series.push(LabeledSeries {
                    file: file.to_string(),
                    features: Vec::new(),
                    label,
                });
                series.len() - 1
            }
        };
        series[slot].features.push(row);
    }

    let Some(first) = series.first() else {
        return Err(RfiError::Validation(format!("{} has no data rows", path.display())));
    };
    let steps = first.features.len();
    if let Some(odd) = series.iter().find(|s| s.features.len() != steps) {
        return Err(RfiError::Validation(format!(
            "series '{}' has {} rows, expected {}",
            odd.file,
            odd.features.len(),
            steps
        )));
    }

    log::info!(
        "Loaded {} series of {} steps from {}",
        series.len(),
        steps,
        path.display()
    );
    Ok(series)
}

/// Shuffle with a fixed seed and split off `ceil(n * test_size)` series for testing
///
/// Returns `(train, test)`.
///
/// # Errors
///
/// `InvalidInput` if `test_size` is not strictly between 0 and 1.
pub fn train_test_split<T>(mut items: Vec<T>, test_size: f64, seed: u64) -> RfiResult<(Vec<T>, Vec<T>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(RfiError::InvalidInput(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let n_test = ((items.len() as f64) * test_size).ceil() as usize;
    let train = items.split_off(n_test.min(items.len()));
    log::debug!("Split {} train / {} test", train.len(), items.len());
    Ok((train, items))
}
