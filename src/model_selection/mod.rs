//! Model selection utilities for cross-validation and train/validation
//! splitting.
//!
//! This module provides:
//! - Train/test splitting ([`train_test_split`])
//! - K-Fold index generation ([`KFold`])
//! - Cross-validation with an arbitrary scoring function ([`cross_validate`])

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{NngaError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;

/// Results from cross-validation.
#[derive(Debug, Clone)]
pub struct CrossValidationResult {
    /// Score for each fold
    pub scores: Vec<f32>,
}

impl CrossValidationResult {
    /// Mean score across folds (NaN if any fold scored NaN).
    pub fn mean(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f32>() / self.scores.len() as f32
    }

    /// Standard deviation of fold scores.
    pub fn std(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .scores
            .iter()
            .map(|&score| (score - mean).powi(2))
            .sum::<f32>()
            / self.scores.len() as f32;
        variance.sqrt()
    }

    /// True if any fold produced a NaN score.
    pub fn has_nan(&self) -> bool {
        self.scores.iter().any(|s| s.is_nan())
    }
}

/// Run cross-validation on an estimator.
///
/// Each fold trains a fresh clone of `estimator` on the training indices and
/// scores it on the held-out indices with `scorer`.
///
/// # Errors
///
/// Returns the first training or scoring error.
///
/// # Example
///
/// ```
/// use nnga::prelude::*;
/// use nnga::model_selection::{cross_validate, KFold};
///
/// #[derive(Clone)]
/// struct MeanModel(f32);
///
/// impl Estimator for MeanModel {
///     fn fit(&mut self, _x: &Matrix<f32>, y: &Vector<f32>) -> nnga::Result<()> {
///         self.0 = y.mean();
///         Ok(())
///     }
///     fn predict(&self, x: &Matrix<f32>) -> nnga::Result<Vector<f32>> {
///         Ok(Vector::from_vec(vec![self.0; x.n_rows()]))
///     }
///     fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> nnga::Result<f32> {
///         Ok(-mae(&self.predict(x)?, y))
///     }
/// }
///
/// let x = Matrix::from_vec(6, 1, vec![0.0; 6]).expect("6x1");
/// let y = Vector::from_slice(&[1.0; 6]);
/// let cv = KFold::new(3);
/// let result = cross_validate(&MeanModel(0.0), &x, &y, &cv, |m, x, y| m.score(x, y))
///     .expect("cv runs");
/// assert_eq!(result.scores.len(), 3);
/// assert!(result.mean().abs() < 1e-6);
/// ```
pub fn cross_validate<E, F>(
    estimator: &E,
    x: &Matrix<f32>,
    y: &Vector<f32>,
    cv: &KFold,
    scorer: F,
) -> Result<CrossValidationResult>
where
    E: Estimator + Clone,
    F: Fn(&E, &Matrix<f32>, &Vector<f32>) -> Result<f32>,
{
    check_samples(x, y)?;
    let splits = cv.split(x.n_rows())?;

    let mut scores = Vec::with_capacity(splits.len());
    for (train_idx, test_idx) in splits {
        let mut fold_model = estimator.clone();
        fold_model.fit(&x.select_rows(&train_idx), &y.select(&train_idx))?;
        scores.push(scorer(
            &fold_model,
            &x.select_rows(&test_idx),
            &y.select(&test_idx),
        )?);
    }

    Ok(CrossValidationResult { scores })
}

/// K-Fold cross-validator.
///
/// Splits data into K consecutive folds. Each fold is used once as test set
/// while the remaining K-1 folds form the training set.
///
/// # Example
///
/// ```
/// use nnga::model_selection::KFold;
///
/// let kfold = KFold::new(5).with_random_state(7);
/// let splits = kfold.split(10).expect("10 samples into 5 folds");
/// assert_eq!(splits.len(), 5);
/// assert!(splits.iter().all(|(train, test)| train.len() == 8 && test.len() == 2));
/// ```
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    /// Create a new K-Fold cross-validator with `n_splits` folds.
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Enable shuffling before splitting into folds.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducible shuffling (implies shuffle).
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self.shuffle = true;
        self
    }

    /// Number of folds.
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate `(train_indices, test_indices)` for each fold.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_splits < 2` or exceeds `n_samples`.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(NngaError::invalid_param("n_splits", self.n_splits, ">= 2"));
        }
        if self.n_splits > n_samples {
            return Err(NngaError::invalid_param(
                "n_splits",
                self.n_splits,
                format!("<= number of samples ({n_samples})"),
            ));
        }

        let indices = if self.shuffle {
            shuffle_indices(n_samples, self.random_state)
        } else {
            (0..n_samples).collect()
        };

        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for i in 0..self.n_splits {
            // Distribute remainder across first folds
            let end = start + fold_size + usize::from(i < remainder);

            let test_indices = indices[start..end].to_vec();
            let mut train_indices = Vec::with_capacity(n_samples - test_indices.len());
            train_indices.extend_from_slice(&indices[..start]);
            train_indices.extend_from_slice(&indices[end..]);

            result.push((train_indices, test_indices));
            start = end;
        }

        Ok(result)
    }
}

/// Shuffles `0..n_samples` with an optional seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    match random_state {
        Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => indices.shuffle(&mut rand::thread_rng()),
    }
    indices
}

fn check_samples(x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
    if x.n_rows() != y.len() {
        return Err(NngaError::DimensionMismatch {
            expected: format!("{} targets", x.n_rows()),
            actual: format!("{} targets", y.len()),
        });
    }
    Ok(())
}

/// Randomly splits `(x, y)` into train and test parts.
///
/// Returns `(x_train, x_test, y_train, y_test)`. The test part holds
/// `round(n * test_size)` rows.
///
/// # Errors
///
/// Returns an error if `test_size` is outside (0, 1), `x` and `y` disagree
/// on the number of samples, or either part would be empty.
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    x: &Matrix<f32>,
    y: &Vector<f32>,
    test_size: f32,
    random_state: Option<u64>,
) -> Result<(Matrix<f32>, Matrix<f32>, Vector<f32>, Vector<f32>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(NngaError::invalid_param(
            "test_size",
            test_size,
            "a fraction in (0, 1)",
        ));
    }
    check_samples(x, y)?;

    let n_samples = x.n_rows();
    let n_test = (n_samples as f32 * test_size).round() as usize;
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(NngaError::EmptyData(format!(
            "split would leave an empty part (n_train={n_train}, n_test={n_test})"
        )));
    }

    let indices = shuffle_indices(n_samples, random_state);
    let (train_idx, test_idx) = indices.split_at(n_train);

    Ok((
        x.select_rows(train_idx),
        x.select_rows(test_idx),
        y.select(train_idx),
        y.select(test_idx),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> (Matrix<f32>, Vector<f32>) {
        let x = Matrix::from_vec(n, 2, (0..n * 2).map(|i| i as f32).collect()).expect("nx2");
        let y = Vector::from_vec((0..n).map(|i| i as f32).collect());
        (x, y)
    }

    #[test]
    fn test_train_test_split_sizes() {
        let (x, y) = dataset(10);
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, Some(42)).expect("split");
        assert_eq!(x_train.n_rows(), 8);
        assert_eq!(x_test.n_rows(), 2);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_test.len(), 2);
    }

    #[test]
    fn test_train_test_split_rows_stay_paired() {
        let (x, y) = dataset(20);
        let (x_train, _, y_train, _) = train_test_split(&x, &y, 0.25, Some(3)).expect("split");
        for i in 0..x_train.n_rows() {
            // Row r holds [2r, 2r+1] and target r.
            assert_eq!(x_train.get(i, 0), 2.0 * y_train[i]);
        }
    }

    #[test]
    fn test_train_test_split_reproducible() {
        let (x, y) = dataset(10);
        let a = train_test_split(&x, &y, 0.3, Some(42)).expect("split");
        let b = train_test_split(&x, &y, 0.3, Some(42)).expect("split");
        assert_eq!(a.2.as_slice(), b.2.as_slice());
        assert_eq!(a.3.as_slice(), b.3.as_slice());
    }

    #[test]
    fn test_train_test_split_invalid_fraction() {
        let (x, y) = dataset(10);
        assert!(train_test_split(&x, &y, 0.0, None).is_err());
        assert!(train_test_split(&x, &y, 1.0, None).is_err());
    }

    #[test]
    fn test_train_test_split_too_small() {
        let (x, y) = dataset(2);
        assert!(matches!(
            train_test_split(&x, &y, 0.1, Some(1)),
            Err(NngaError::EmptyData(_))
        ));
    }

    #[test]
    fn test_train_test_split_mismatched_lengths() {
        let (x, _) = dataset(4);
        let y = Vector::from_slice(&[1.0, 2.0]);
        assert!(matches!(
            train_test_split(&x, &y, 0.5, None),
            Err(NngaError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_kfold_covers_every_sample_once() {
        let splits = KFold::new(3).split(10).expect("split");
        let mut seen: Vec<usize> = splits.iter().flat_map(|(_, t)| t.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        // Remainder goes to the first fold
        assert_eq!(splits[0].1.len(), 4);
        assert_eq!(splits[2].1.len(), 3);
    }

    #[test]
    fn test_kfold_train_and_test_disjoint() {
        for (train, test) in KFold::new(4).with_random_state(9).split(12).expect("split") {
            assert!(test.iter().all(|t| !train.contains(t)));
            assert_eq!(train.len() + test.len(), 12);
        }
    }

    #[test]
    fn test_kfold_invalid_splits() {
        assert!(KFold::new(1).split(10).is_err());
        assert!(KFold::new(5).split(3).is_err());
    }

    #[test]
    fn test_kfold_shuffle_reproducible() {
        let a = KFold::new(2).with_random_state(7).split(8).expect("split");
        let b = KFold::new(2).with_random_state(7).split(8).expect("split");
        assert_eq!(a, b);
    }

    #[derive(Clone)]
    struct MeanModel(f32);

    impl Estimator for MeanModel {
        fn fit(&mut self, _x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
            self.0 = y.mean();
            Ok(())
        }
        fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
            Ok(Vector::from_vec(vec![self.0; x.n_rows()]))
        }
        fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32> {
            Ok(crate::metrics::r_squared(&self.predict(x)?, y))
        }
    }

    #[test]
    fn test_cross_validate_runs_each_fold() {
        let (x, y) = dataset(9);
        let result = cross_validate(&MeanModel(0.0), &x, &y, &KFold::new(3), |m, x, _| {
            Ok(m.predict(x)?[0])
        })
        .expect("cv");
        assert_eq!(result.scores.len(), 3);
        // Unshuffled folds: fold 0 trains on 3..9 (mean 5.5)
        assert!((result.scores[0] - 5.5).abs() < 1e-6);
        assert!(!result.has_nan());
    }

    #[test]
    fn test_cross_validation_result_nan() {
        let r = CrossValidationResult {
            scores: vec![0.5, f32::NAN],
        };
        assert!(r.has_nan());
        assert!(r.mean().is_nan());
    }
}
