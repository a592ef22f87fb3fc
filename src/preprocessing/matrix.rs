//! Signal matrix: capture-ordered rows of fixed-width complex frames

use num_complex::Complex64;

use crate::error::{RfiError, RfiResult};

/// Immutable row-major matrix of complex samples
///
/// Each row is one frame of `cols` samples; rows keep capture-time order.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    data: Vec<Complex64>,
    rows: usize,
    cols: usize,
}

impl SignalMatrix {
    /// Build a matrix from row-major data
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `data.len() != rows * cols`.
    pub fn new(data: Vec<Complex64>, rows: usize, cols: usize) -> RfiResult<Self> {
        if data.len() != rows * cols {
            return Err(RfiError::InvalidInput(format!(
                "{} samples cannot form a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Shape a flat sample stream into complete frames of `frame_width`
    ///
    /// Samples past the last complete frame are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if not even one complete frame is present.
    pub fn from_samples(mut samples: Vec<Complex64>, frame_width: usize) -> RfiResult<Self> {
        if frame_width == 0 {
            return Err(RfiError::InvalidInput("frame width must be > 0".to_string()));
        }
        let rows = samples.len() / frame_width;
        if rows == 0 {
            return Err(RfiError::Validation(format!(
                "no complete frames ({} samples, frame width {})",
                samples.len(),
                frame_width
            )));
        }
        samples.truncate(rows * frame_width);
        Ok(Self {
            data: samples,
            rows,
            cols: frame_width,
        })
    }

    /// Number of rows (frames)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (samples per frame)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sample at (`row`, `col`)
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.cols + col]
    }

    /// One frame
    pub fn row(&self, row: usize) -> &[Complex64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate frames in capture order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Complex64]> {
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Row-major view of every sample
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// Consume the matrix, returning its row-major samples
    pub fn into_vec(self) -> Vec<Complex64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(n: usize) -> Vec<Complex64> {
        (0..n).map(|i| Complex64::new(i as f64, 0.0)).collect()
    }

    #[test]
    fn test_new_checks_shape() {
        assert!(SignalMatrix::new(seq(6), 2, 3).is_ok());
        assert!(SignalMatrix::new(seq(5), 2, 3).is_err());
    }

    #[test]
    fn test_row_major_access() {
        let m = SignalMatrix::new(seq(6), 2, 3).unwrap();
        assert_eq!(m.get(1, 0).re, 3.0);
        assert_eq!(m.row(1)[2].re, 5.0);
        assert_eq!(m.iter_rows().count(), 2);
    }

    #[test]
    fn test_from_samples_truncates() {
        let m = SignalMatrix::from_samples(seq(7), 3).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 3));
        assert_eq!(m.as_slice().len(), 6);
    }

    #[test]
    fn test_from_samples_requires_a_frame() {
        let result = SignalMatrix::from_samples(seq(2), 3);
        assert!(matches!(result, Err(RfiError::Validation(_))));
    }
}
