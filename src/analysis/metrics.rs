//! Classification metrics and model evaluation
//!
//! Accuracy plus support-weighted precision, recall and F1 over the sorted
//! union of true and predicted labels. A class with no predictions (or no
//! support) contributes 0 instead of dividing by zero.
//!
//! # Example
//!
//! ```
//! use rfi_dsp::analysis::metrics::ClassificationMetrics;
//! use rfi_dsp::Label;
//!
//! let y_true = [Label::Radar, Label::Lte, Label::Lte];
//! let y_pred = [Label::Radar, Label::Lte, Label::Radar];
//! let m = ClassificationMetrics::compute(&y_true, &y_pred)?;
//! assert!((m.accuracy - 2.0 / 3.0).abs() < 1e-12);
//! # Ok::<(), rfi_dsp::RfiError>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::label::Label;
use crate::dataset::split::LabeledSeries;
use crate::error::{RfiError, RfiResult};
use crate::ml::model::{majority_label, Model, ModelInput};

/// Classification quality scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Fraction of exact matches
    pub accuracy: f64,
    /// Support-weighted precision
    pub precision: f64,
    /// Support-weighted recall
    pub recall: f64,
    /// Support-weighted F1
    pub f1: f64,
    /// Labels indexing the confusion matrix, ascending by id
    pub labels: Vec<Label>,
    /// `confusion[true][predicted]` counts
    pub confusion: Vec<Vec<usize>>,
}

impl ClassificationMetrics {
    /// Compute metrics from paired true and predicted labels
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the slices differ in length or are empty.
    pub fn compute(y_true: &[Label], y_pred: &[Label]) -> RfiResult<Self> {
        if y_true.len() != y_pred.len() {
            return Err(RfiError::InvalidInput(format!(
                "y_true has {} labels but y_pred has {}",
                y_true.len(),
                y_pred.len()
            )));
        }
        if y_true.is_empty() {
            return Err(RfiError::InvalidInput("no labels to score".to_string()));
        }

        let mut labels: Vec<Label> = y_true.iter().chain(y_pred).copied().collect();
        labels.sort();
        labels.dedup();
        let index: BTreeMap<Label, usize> =
            labels.iter().enumerate().map(|(i, &l)| (l, i)).collect();

        let n = labels.len();
        let mut confusion = vec![vec![0usize; n]; n];
        for (t, p) in y_true.iter().zip(y_pred) {
            confusion[index[t]][index[p]] += 1;
        }

        let total = y_true.len() as f64;
        let correct: usize = (0..n).map(|i| confusion[i][i]).sum();

        let mut precision = 0.0;
        let mut recall = 0.0;
        let mut f1 = 0.0;
        for i in 0..n {
            let tp = confusion[i][i] as f64;
            let support: usize = confusion[i].iter().sum();
            let predicted: usize = confusion.iter().map(|row| row[i]).sum();

            let p = ratio(tp, predicted as f64);
            let r = ratio(tp, support as f64);
            let f = ratio(2.0 * p * r, p + r);

            let weight = support as f64 / total;
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;
        }

        let metrics = Self {
            accuracy: correct as f64 / total,
            precision,
            recall,
            f1,
            labels,
            confusion,
        };
        log::info!(
            "Model metrics: accuracy={:.4} precision={:.4} recall={:.4} f1={:.4}",
            metrics.accuracy,
            metrics.precision,
            metrics.recall,
            metrics.f1
        );
        Ok(metrics)
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Result of scoring a model over a labelled test set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Per-series metrics
    pub metrics: ClassificationMetrics,
    /// One predicted label per series, in input order
    pub predictions: Vec<Label>,
    /// Most common prediction across the set (ties to the lowest id)
    pub majority: Label,
}

/// Classify every series and score the predictions against their labels
pub fn evaluate<M: Model + ?Sized>(model: &mut M, series: &[LabeledSeries]) -> RfiResult<Evaluation> {
    if series.is_empty() {
        return Err(RfiError::InvalidInput("test set is empty".to_string()));
    }

    let mut predictions = Vec::with_capacity(series.len());
    for s in series {
        let input = ModelInput::from_features(&s.features)?;
        let scores = model.predict(&input)?;
        predictions.push(majority_label(&scores)?);
    }

    let y_true: Vec<Label> = series.iter().map(|s| s.label).collect();
    let metrics = ClassificationMetrics::compute(&y_true, &predictions)?;

    let mut votes: BTreeMap<Label, usize> = BTreeMap::new();
    for &label in &predictions {
        *votes.entry(label).or_insert(0) += 1;
    }
    let mut majority = Label::Undefined;
    let mut best = 0;
    for (&label, &count) in &votes {
        if count > best {
            majority = label;
            best = count;
        }
    }

    Ok(Evaluation {
        metrics,
        predictions,
        majority,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::FnModel;

    #[test]
    fn test_perfect_predictions() {
        let y = [Label::NoRfi, Label::Radar, Label::Lte];
        let m = ClassificationMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1, 1.0);
        assert_eq!(m.confusion, vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn test_weighted_scores() {
        // Radar: support 1, predicted 2 (1 correct) -> p=0.5, r=1
        // LTE:   support 2, predicted 1 (1 correct) -> p=1, r=0.5
        let y_true = [Label::Radar, Label::Lte, Label::Lte];
        let y_pred = [Label::Radar, Label::Lte, Label::Radar];
        let m = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();

        assert_eq!(m.labels, vec![Label::Radar, Label::Lte]);
        assert_eq!(m.confusion, vec![vec![1, 0], vec![1, 1]]);
        assert!((m.precision - (0.5 / 3.0 + 2.0 / 3.0)).abs() < 1e-12);
        assert!((m.recall - (1.0 / 3.0 + 1.0 / 3.0)).abs() < 1e-12);
        let f = 2.0 * 0.5 / 1.5;
        assert!((m.f1 - f).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_prediction_counts_zero() {
        let y_true = [Label::Jammer, Label::Jammer];
        let y_pred = [Label::Square, Label::Jammer];
        let m = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(m.recall, 0.5);
        assert_eq!(m.precision, 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ClassificationMetrics::compute(&[Label::Lte], &[]).is_err());
        assert!(ClassificationMetrics::compute(&[], &[]).is_err());
    }

    #[test]
    fn test_evaluate_uses_series_labels() {
        // predicts Radar when the first real value is positive, else LTE
        let mut model = FnModel(|input: &ModelInput| -> RfiResult<Vec<Vec<f32>>> {
            let class = if input.step(0)[0] > 0.0 { 2 } else { 5 };
            let mut row = vec![0.0; 6];
            row[class] = 1.0;
            Ok(vec![row])
        });
        let series = vec![
            LabeledSeries {
                file: "a_1.csv".to_string(),
                features: vec![[1.0, 0.0, 0.0, 0.0]; 4],
                label: Label::Radar,
            },
            LabeledSeries {
                file: "b_1.csv".to_string(),
                features: vec![[-1.0, 0.0, 0.0, 0.0]; 4],
                label: Label::Radar,
            },
            LabeledSeries {
                file: "c_1.csv".to_string(),
                features: vec![[-1.0, 0.0, 0.0, 0.0]; 4],
                label: Label::Lte,
            },
        ];

        let eval = evaluate(&mut model, &series).unwrap();
        assert_eq!(eval.predictions, vec![Label::Radar, Label::Lte, Label::Lte]);
        assert_eq!(eval.majority, Label::Lte);
        assert!((eval.metrics.accuracy - 2.0 / 3.0).abs() < 1e-12);
    }
}
