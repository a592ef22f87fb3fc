//! Classification model capability
//!
//! A model takes a `(1, time_steps, 4)` tensor with channel order
//! `[real, imag, phase, magnitude_dB]` and returns class scores, either one
//! row per time step or a single row. [`majority_label`] reduces those
//! scores to one [`Label`].

use std::collections::BTreeMap;

use num_complex::Complex64;

use crate::analysis::label::Label;
use crate::error::{RfiError, RfiResult};
use crate::features::record::{feature_matrix, FEATURE_CHANNELS};

/// Model input tensor of shape `(1, time_steps, 4)`, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    data: Vec<f32>,
    time_steps: usize,
}

impl ModelInput {
    /// Build from per-time-step feature rows
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty series.
    pub fn from_features(rows: &[[f32; FEATURE_CHANNELS]]) -> RfiResult<Self> {
        if rows.is_empty() {
            return Err(RfiError::InvalidInput(
                "model input series is empty".to_string(),
            ));
        }
        Ok(Self {
            data: rows.iter().flatten().copied().collect(),
            time_steps: rows.len(),
        })
    }

    /// Derive the feature rows of complex samples and build the tensor
    pub fn from_samples(samples: &[Complex64]) -> RfiResult<Self> {
        Self::from_features(&feature_matrix(samples))
    }

    /// `[1, time_steps, 4]`
    pub fn shape(&self) -> [usize; 3] {
        [1, self.time_steps, FEATURE_CHANNELS]
    }

    /// Number of time steps
    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Channels of one time step
    pub fn step(&self, t: usize) -> &[f32] {
        &self.data[t * FEATURE_CHANNELS..(t + 1) * FEATURE_CHANNELS]
    }

    /// Flat row-major data
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Opaque classifier: tensor in, class scores out
pub trait Model {
    /// Score the input
    ///
    /// Returns one row of class scores per time step, or a single row for
    /// the whole series. Column `i` scores the label with id `i`.
    fn predict(&mut self, input: &ModelInput) -> RfiResult<Vec<Vec<f32>>>;
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&mut self, input: &ModelInput) -> RfiResult<Vec<Vec<f32>>> {
        (**self).predict(input)
    }
}

/// Adapter turning a closure into a [`Model`]
pub struct FnModel<F>(pub F);

impl<F> Model for FnModel<F>
where
    F: FnMut(&ModelInput) -> RfiResult<Vec<Vec<f32>>>,
{
    fn predict(&mut self, input: &ModelInput) -> RfiResult<Vec<Vec<f32>>> {
        (self.0)(input)
    }
}

impl<F> std::fmt::Debug for FnModel<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnModel")
    }
}

/// Index of the highest score; ties resolve to the lowest index
fn argmax(row: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in row.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Reduce per-time-step scores to a single label by majority vote
///
/// Each row votes for its argmax class; the most frequent class wins and
/// ties go to the lowest class id.
///
/// # Errors
///
/// Returns `Model` if there are no usable rows or the winning class is not
/// part of the label vocabulary.
pub fn majority_label(scores: &[Vec<f32>]) -> RfiResult<Label> {
    let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
    for row in scores {
        if let Some(class) = argmax(row) {
            *votes.entry(class).or_insert(0) += 1;
        }
    }

    // BTreeMap iterates ascending, so keeping only strictly larger counts
    // leaves the lowest class id among equal counts.
    let mut winner: Option<(usize, usize)> = None;
    for (&class, &count) in &votes {
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((class, count));
        }
    }

    let (class, count) = winner
        .ok_or_else(|| RfiError::Model("model returned no class scores".to_string()))?;
    log::debug!(
        "Majority vote: class {} with {}/{} votes",
        class,
        count,
        scores.len()
    );
    Label::from_id(class as i64)
        .ok_or_else(|| RfiError::Model(format!("class index {} is outside the label vocabulary", class)))
}

/// Run the model over complex samples and reduce to one label
pub fn classify<M: Model + ?Sized>(model: &mut M, samples: &[Complex64]) -> RfiResult<Label> {
    let input = ModelInput::from_samples(samples)?;
    let scores = model.predict(&input)?;
    majority_label(&scores)
}
