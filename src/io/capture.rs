//! Binary IQ capture decoding
//!
//! Captures are little-endian 16-bit integers interleaved as (I, Q) pairs,
//! grouped into frames of [`FRAME_WIDTH`] complex samples.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::config::FRAME_WIDTH;
use crate::error::{RfiError, RfiResult};
use crate::preprocessing::matrix::SignalMatrix;

/// Integer encoding of a capture file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Signed 16-bit pairs
    I16,
    /// Unsigned 16-bit pairs
    U16,
}

impl SampleFormat {
    /// Bytes per stored integer.
    pub const fn width(self) -> usize {
        2
    }
}

/// Read complex samples from a capture file
///
/// # Arguments
///
/// * `path` - Capture file
/// * `format` - Integer encoding
/// * `max_rows` - Optional cap on frames read (`max_rows * 1536` complex samples)
///
/// # Errors
///
/// `MissingResource` if the file does not exist, `Validation` if the stored
/// integer count is odd.
pub fn read_capture(
    path: impl AsRef<Path>,
    format: SampleFormat,
    max_rows: Option<usize>,
) -> RfiResult<Vec<Complex64>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RfiError::MissingResource(path.to_path_buf()));
    }

    let mut file = File::open(path).map_err(|e| RfiError::io(path, e))?;
    let mut bytes = Vec::new();
    let read = match max_rows {
        Some(rows) => {
            let bytes_per_row = FRAME_WIDTH * 2 * format.width();
            let limit = u64::try_from(rows.saturating_mul(bytes_per_row)).unwrap_or(u64::MAX);
            file.take(limit).read_to_end(&mut bytes)
        }
        None => file.read_to_end(&mut bytes),
    };
    read.map_err(|e| RfiError::io(path, e))?;

    let samples = decode_interleaved(&bytes, format)?;
    log::debug!(
        "Read {} complex samples from {} ({:?})",
        samples.len(),
        path.display(),
        format
    );
    Ok(samples)
}

/// Decode interleaved little-endian integers into complex samples.
///
/// A trailing partial integer is ignored; an odd number of whole integers is
/// rejected.
pub fn decode_interleaved(bytes: &[u8], format: SampleFormat) -> RfiResult<Vec<Complex64>> {
    let count = bytes.len() / format.width();
    if count % 2 != 0 {
        return Err(RfiError::Validation(format!(
            "capture holds {} integers, expected an even number of I/Q values",
            count
        )));
    }
    let bytes = &bytes[..count * format.width()];

    let values: Vec<f64> = match format {
        SampleFormat::I16 => {
            let mut raw = vec![0i16; count];
            LittleEndian::read_i16_into(bytes, &mut raw);
            raw.into_iter().map(f64::from).collect()
        }
        SampleFormat::U16 => {
            let mut raw = vec![0u16; count];
            LittleEndian::read_u16_into(bytes, &mut raw);
            raw.into_iter().map(f64::from).collect()
        }
    };

    Ok(values
        .chunks_exact(2)
        .map(|pair| Complex64::new(pair[0], pair[1]))
        .collect())
}

/// Read a capture and shape it into a [`SignalMatrix`] of complete frames.
pub fn read_signal_matrix(
    path: impl AsRef<Path>,
    format: SampleFormat,
    max_rows: usize,
) -> RfiResult<SignalMatrix> {
    let path = path.as_ref();
    let samples = read_capture(path, format, Some(max_rows))?;
    SignalMatrix::from_samples(samples, FRAME_WIDTH).map_err(|e| match e {
        RfiError::Validation(msg) => {
            RfiError::Validation(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}
