//! Energy-peak-centred circular window extraction
//!
//! Trims the guard margins of a [`SignalMatrix`], finds the column with the
//! most (smoothed) energy and keeps a fixed-width run of columns around it,
//! wrapping circularly at the edges.
//!
//! # Example
//!
//! ```
//! use num_complex::Complex64;
//! use rfi_dsp::config::ExtractionConfig;
//! use rfi_dsp::features::window::extract;
//! use rfi_dsp::preprocessing::matrix::SignalMatrix;
//!
//! let matrix = SignalMatrix::new(vec![Complex64::new(1.0, 0.0); 4 * 1536], 4, 1536)?;
//! let extraction = extract(&matrix, &ExtractionConfig::new(600, 5))?;
//! assert_eq!(extraction.sample_count, 4 * 600);
//! # Ok::<(), rfi_dsp::RfiError>(())
//! ```

use num_complex::Complex64;

use crate::config::ExtractionConfig;
use crate::error::{RfiError, RfiResult};
use crate::features::energy::{argmax_first, energy_profile, moving_average_same};
use crate::preprocessing::guard::trim_guards;
use crate::preprocessing::matrix::SignalMatrix;

/// Resolved circular run of column indices (post-trim coordinates)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionWindow {
    /// Column with the highest smoothed energy
    pub peak: usize,
    /// First selected column, `(peak - width / 2) mod C`
    pub start: usize,
    /// Selected columns in order; each lies in `[0, C)`
    pub indices: Vec<usize>,
}

impl ExtractionWindow {
    /// Whether `column` is part of the window
    pub fn contains(&self, column: usize) -> bool {
        self.indices.contains(&column)
    }

    /// Number of selected columns
    pub fn width(&self) -> usize {
        self.indices.len()
    }
}

/// Output of [`extract`]
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// `rows * columns`
    pub sample_count: usize,
    /// Rows in the source matrix
    pub rows: usize,
    /// Columns kept per row
    pub columns: usize,
    /// Selected samples, flattened row-major
    pub samples: Vec<Complex64>,
    /// The window used; `None` when the trimmed matrix was returned whole
    pub window: Option<ExtractionWindow>,
}

/// Circular run of `width` indices starting at `peak - width / 2`, modulo `cols`
///
/// `cols` must be non-zero.
pub fn circular_indices(peak: usize, width: usize, cols: usize) -> Vec<usize> {
    let cols_i = cols as i64;
    let start = peak as i64 - (width / 2) as i64;
    (0..width as i64)
        .map(|offset| (start + offset).rem_euclid(cols_i) as usize)
        .collect()
}

/// Extract the energy-centred window from a signal matrix
///
/// # Arguments
///
/// * `matrix` - Frames of complex samples (typically 1536 columns)
/// * `config` - Window width, smoothing width and guard margins
///
/// # Returns
///
/// If the trimmed column count `C` is at most `extraction_window`, the whole
/// trimmed matrix (`sample_count = rows * C`). Otherwise exactly
/// `extraction_window` columns (`sample_count = rows * extraction_window`).
///
/// # Errors
///
/// Returns `InvalidInput` for zero-sized windows, an empty matrix, or guard
/// margins that consume every column.
pub fn extract(matrix: &SignalMatrix, config: &ExtractionConfig) -> RfiResult<Extraction> {
    config.validate()?;
    if matrix.rows() == 0 {
        return Err(RfiError::InvalidInput("signal matrix has no rows".to_string()));
    }

    let trimmed = trim_guards(matrix, config.leading_guard, config.trailing_guard)?;
    let rows = trimmed.rows();
    let cols = trimmed.cols();
    let width = config.extraction_window;

    if cols <= width {
        log::debug!(
            "Trimmed width {} <= window {}, keeping all columns",
            cols,
            width
        );
        return Ok(Extraction {
            sample_count: rows * cols,
            rows,
            columns: cols,
            samples: trimmed.into_vec(),
            window: None,
        });
    }

    let energy = energy_profile(&trimmed);
    let smoothed = moving_average_same(&energy, config.moving_avg_window);
    let peak = argmax_first(&smoothed).unwrap_or(0);
    let indices = circular_indices(peak, width, cols);

    let mut samples = Vec::with_capacity(rows * width);
    for row in trimmed.iter_rows() {
        samples.extend(indices.iter().map(|&c| row[c]));
    }

    log::debug!(
        "Energy window: peak column {} of {}, {} columns x {} rows",
        peak,
        cols,
        width,
        rows
    );

    Ok(Extraction {
        sample_count: rows * width,
        rows,
        columns: width,
        samples,
        window: Some(ExtractionWindow {
            peak,
            start: indices[0],
            indices,
        }),
    })
}
