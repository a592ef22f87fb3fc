//! Per-column energy profile and smoothing
//!
//! Algorithm:
//! 1. Sum squared magnitudes down each column: E[c] = Σ_rows |x[row, c]|²
//! 2. Smooth with a centred moving average of width K ("same"-length
//!    convolution against a uniform kernel, zero-padded at the edges)
//! 3. Locate the peak (first occurrence of the maximum)

use crate::preprocessing::matrix::SignalMatrix;

/// Energy per column, summed across all rows
pub fn energy_profile(matrix: &SignalMatrix) -> Vec<f64> {
    let mut energy = vec![0.0f64; matrix.cols()];
    for row in matrix.iter_rows() {
        for (acc, sample) in energy.iter_mut().zip(row) {
            *acc += sample.norm_sqr();
        }
    }
    energy
}

/// Centred moving average with output length equal to input length
///
/// Bin `i` averages `values[i - K/2 ..= i - K/2 + K - 1]`, treating indices
/// outside the input as zero. The divisor is always `K`, so edge bins are
/// pulled down by the zero padding. For even `K` the window extends one bin
/// further to the left than to the right.
///
/// # Arguments
///
/// * `values` - Input sequence
/// * `window` - Kernel width K (0 is treated as 1)
pub fn moving_average_same(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let k = window.max(1);
    let left = (k / 2) as isize;
    let scale = 1.0 / k as f64;

    (0..n as isize)
        .map(|i| {
            let lo = (i - left).max(0);
            let hi = (i - left + k as isize - 1).min(n as isize - 1);
            if lo > hi {
                return 0.0;
            }
            values[lo as usize..=hi as usize].iter().sum::<f64>() * scale
        })
        .collect()
}

/// Index of the maximum value; ties resolve to the lowest index
///
/// NaN values never win. Returns `None` for an empty slice.
pub fn argmax_first(values: &[f64]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut best_idx = 0;
    let mut best = f64::NAN;
    for (i, &v) in values.iter().enumerate() {
        // strict comparison keeps the first of equal maxima
        if (best.is_nan() && !v.is_nan()) || v > best {
            best = v;
            best_idx = i;
        }
    }
    Some(best_idx)
}
