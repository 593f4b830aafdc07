//! Classification metrics for evaluating classifier performance.
//!
//! Provides accuracy, precision, recall, F1-score and ROC-AUC. Labels are
//! class indices (`usize`); [`to_labels`] converts `f32` targets.

/// Averaging strategy for precision/recall/F1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Average {
    /// Only report the positive class (label 1), like sklearn's default.
    Binary,
    /// Calculate metrics for each label, return unweighted mean.
    Macro,
    /// Calculate metrics globally by counting total TP, FP, FN.
    Micro,
    /// Weighted mean by support (number of true instances per label).
    Weighted,
}

/// Converts `f32` class targets (0.0, 1.0, ...) into label indices.
///
/// Values are rounded and negatives clamp to 0.
#[must_use]
pub fn to_labels(values: &[f32]) -> Vec<usize> {
    values.iter().map(|v| v.round().max(0.0) as usize).collect()
}

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use nnga::metrics::classification::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true);
/// assert!((acc - 0.333333).abs() < 0.001);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    check_lengths(y_pred, y_true);

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}

/// Compute precision score: TP / (TP + FP).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn precision(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    check_lengths(y_pred, y_true);
    let counts = ClassCounts::new(y_pred, y_true);
    counts.average(average, |tp, fp, _| ratio(tp, tp + fp))
}

/// Compute recall score: TP / (TP + FN).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn recall(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    check_lengths(y_pred, y_true);
    let counts = ClassCounts::new(y_pred, y_true);
    counts.average(average, |tp, _, fn_count| ratio(tp, tp + fn_count))
}

/// Compute F1 score (harmonic mean of precision and recall).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use nnga::metrics::classification::{f1_score, Average};
///
/// let y_true = vec![1, 0, 1, 1];
/// let y_pred = vec![1, 0, 0, 1];
/// // precision 1.0, recall 2/3
/// let f1 = f1_score(&y_pred, &y_true, Average::Binary);
/// assert!((f1 - 0.8).abs() < 1e-6);
/// ```
#[must_use]
pub fn f1_score(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    check_lengths(y_pred, y_true);
    let counts = ClassCounts::new(y_pred, y_true);
    counts.average(average, class_f1)
}

/// Area under the ROC curve for binary labels.
///
/// `scores` are positive-class scores (probabilities or raw outputs).
/// Ties share rank (Mann-Whitney U formulation). Returns `NaN` when
/// `y_true` contains only one class, where the AUC is undefined.
///
/// # Panics
///
/// Panics if lengths differ or inputs are empty.
///
/// # Examples
///
/// ```
/// use nnga::metrics::classification::roc_auc_score;
///
/// let auc = roc_auc_score(&[0.1, 0.4, 0.35, 0.8], &[0, 0, 1, 1]);
/// assert!((auc - 0.75).abs() < 1e-6);
/// ```
#[must_use]
pub fn roc_auc_score(scores: &[f32], y_true: &[usize]) -> f32 {
    assert_eq!(scores.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let n_pos = y_true.iter().filter(|&&y| y == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return f32::NAN;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks (1-based) over tied groups.
    let mut ranks = vec![0.0_f64; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&y, _)| y == 1)
        .map(|(_, r)| r)
        .sum();
    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    (u / (n_pos * n_neg as f64)) as f32
}

fn check_lengths(y_pred: &[usize], y_true: &[usize]) {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");
}

fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Compute F1 score for a single class.
fn class_f1(tp: usize, fp: usize, fn_count: usize) -> f32 {
    let prec = ratio(tp, tp + fp);
    let rec = ratio(tp, tp + fn_count);
    if prec + rec == 0.0 {
        0.0
    } else {
        2.0 * prec * rec / (prec + rec)
    }
}

/// Per-class TP, FP, FN and support.
struct ClassCounts {
    tp: Vec<usize>,
    fp: Vec<usize>,
    fn_counts: Vec<usize>,
    support: Vec<usize>,
}

impl ClassCounts {
    fn new(y_pred: &[usize], y_true: &[usize]) -> Self {
        // At least two classes so Binary always has a slot for label 1.
        let n_classes = y_true
            .iter()
            .chain(y_pred.iter())
            .max()
            .map_or(2, |&m| (m + 1).max(2));

        let mut counts = Self {
            tp: vec![0; n_classes],
            fp: vec![0; n_classes],
            fn_counts: vec![0; n_classes],
            support: vec![0; n_classes],
        };

        for (&true_label, &pred_label) in y_true.iter().zip(y_pred.iter()) {
            counts.support[true_label] += 1;
            if true_label == pred_label {
                counts.tp[true_label] += 1;
            } else {
                counts.fp[pred_label] += 1;
                counts.fn_counts[true_label] += 1;
            }
        }
        counts
    }

    fn average<F>(&self, average: Average, metric: F) -> f32
    where
        F: Fn(usize, usize, usize) -> f32,
    {
        let per_class = |i: usize| metric(self.tp[i], self.fp[i], self.fn_counts[i]);
        let n_classes = self.tp.len();

        match average {
            Average::Binary => per_class(1),
            Average::Micro => metric(
                self.tp.iter().sum(),
                self.fp.iter().sum(),
                self.fn_counts.iter().sum(),
            ),
            Average::Macro => (0..n_classes).map(per_class).sum::<f32>() / n_classes as f32,
            Average::Weighted => {
                let total_support: usize = self.support.iter().sum();
                if total_support == 0 {
                    return 0.0;
                }
                (0..n_classes)
                    .map(|i| per_class(i) * self.support[i] as f32 / total_support as f32)
                    .sum()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_perfect() {
        assert_eq!(accuracy(&[0, 1, 1], &[0, 1, 1]), 1.0);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_accuracy_length_mismatch() {
        let _ = accuracy(&[0, 1], &[0]);
    }

    #[test]
    fn test_binary_precision_recall() {
        let y_true = vec![1, 1, 0, 0];
        let y_pred = vec![1, 0, 1, 0];
        assert!((precision(&y_pred, &y_true, Average::Binary) - 0.5).abs() < 1e-6);
        assert!((recall(&y_pred, &y_true, Average::Binary) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_binary_f1_no_positive_predictions_is_zero() {
        assert_eq!(f1_score(&[0, 0, 0], &[1, 0, 1], Average::Binary), 0.0);
    }

    #[test]
    fn test_binary_f1_all_negative_labels() {
        // No class-1 slot in the data still yields a defined score.
        assert_eq!(f1_score(&[0, 0], &[0, 0], Average::Binary), 0.0);
    }

    #[test]
    fn test_macro_and_weighted() {
        let y_true = vec![0, 1, 2, 0, 1, 2];
        let y_pred = vec![0, 2, 1, 0, 0, 1];
        let macro_f1 = f1_score(&y_pred, &y_true, Average::Macro);
        let weighted = f1_score(&y_pred, &y_true, Average::Weighted);
        // Class 0: P=2/3 R=1 F1=0.8; classes 1, 2 have F1=0
        assert!((macro_f1 - 0.8 / 3.0).abs() < 1e-5);
        assert!((weighted - 0.8 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_micro_equals_accuracy_for_single_label() {
        let y_true = vec![0, 1, 2, 0, 1, 2];
        let y_pred = vec![0, 2, 1, 0, 0, 1];
        let micro = precision(&y_pred, &y_true, Average::Micro);
        assert!((micro - accuracy(&y_pred, &y_true)).abs() < 1e-6);
    }

    #[test]
    fn test_roc_auc_perfect_and_inverted() {
        assert!((roc_auc_score(&[0.1, 0.2, 0.8, 0.9], &[0, 0, 1, 1]) - 1.0).abs() < 1e-6);
        assert!(roc_auc_score(&[0.9, 0.8, 0.2, 0.1], &[0, 0, 1, 1]).abs() < 1e-6);
    }

    #[test]
    fn test_roc_auc_ties_count_half() {
        let auc = roc_auc_score(&[0.5, 0.5], &[0, 1]);
        assert!((auc - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_roc_auc_single_class_is_nan() {
        assert!(roc_auc_score(&[0.2, 0.7], &[1, 1]).is_nan());
    }

    #[test]
    fn test_to_labels() {
        assert_eq!(to_labels(&[0.0, 1.0, 0.9, -0.2, 2.0]), vec![0, 1, 1, 0, 2]);
    }
}
