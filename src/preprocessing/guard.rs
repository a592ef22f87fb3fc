//! Guard-margin trimming
//!
//! The outermost columns of every frame carry filter roll-off rather than
//! signal, so a fixed number of columns is dropped from each edge before
//! any energy analysis.

use crate::error::{RfiError, RfiResult};
use crate::preprocessing::matrix::SignalMatrix;

/// Drop `leading` columns from the start and `trailing` from the end of every row
///
/// # Errors
///
/// Returns `InvalidInput` if the matrix has no rows or the margins leave no
/// columns.
pub fn trim_guards(
    matrix: &SignalMatrix,
    leading: usize,
    trailing: usize,
) -> RfiResult<SignalMatrix> {
    if matrix.rows() == 0 {
        return Err(RfiError::InvalidInput("signal matrix has no rows".to_string()));
    }
    let cols = matrix.cols();
    if leading + trailing >= cols {
        return Err(RfiError::InvalidInput(format!(
            "guard margins {}+{} leave no columns of {}",
            leading, trailing, cols
        )));
    }

    let kept = cols - leading - trailing;
    let mut data = Vec::with_capacity(matrix.rows() * kept);
    for row in matrix.iter_rows() {
        data.extend_from_slice(&row[leading..cols - trailing]);
    }

    log::debug!(
        "Trimmed guard margins: {} -> {} columns ({} rows)",
        cols,
        kept,
        matrix.rows()
    );
    SignalMatrix::new(data, matrix.rows(), kept)
}
