//! Core traits for estimators, transformers and pipeline adaptors.
//!
//! These traits define the API contracts shared by the neural network,
//! the scaler and the genetic search.

use crate::data::DataFrame;
use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// Primary trait for supervised learning estimators.
///
/// Estimators implement fit/predict/score following sklearn conventions.
pub trait Estimator {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, divergence, etc.).
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()>;

    /// Predicts target values for input data.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimator is not fitted or `x` has the wrong width.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>>;

    /// Computes the score (R² for regression, accuracy for classification).
    ///
    /// # Errors
    ///
    /// Same conditions as [`Estimator::predict`].
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32>;
}

/// Trait for data transformers (scalers, encoders, etc.).
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if transformer is not fitted.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// The `fit(df, target)` / `predict(df, target)` contract of an AutoML
/// pipeline stage.
///
/// Implementors take a whole `DataFrame` and the name of the target column,
/// and work out the feature matrix themselves.
pub trait PipelineAdaptor {
    /// Fits the stage on `df`, learning to predict column `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target column is missing or fitting fails.
    fn fit(&mut self, df: &DataFrame, target: &str) -> Result<()>;

    /// Predicts `target` for every row of `df`.
    ///
    /// The target column may be present (it is ignored) or absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::NngaError::NotFitted`] before `fit`.
    fn predict(&self, df: &DataFrame, target: &str) -> Result<Vector<f32>>;

    /// Whether `fit` has completed successfully.
    fn is_fitted(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NngaError;

    // Mock transformer to test trait default methods
    struct MockTransformer {
        fitted: bool,
        scale: f32,
    }

    impl Transformer for MockTransformer {
        fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
            if x.n_rows() == 0 {
                return Err(NngaError::EmptyData("mock transformer".to_string()));
            }
            let total = x.as_slice().iter().sum::<f32>();
            self.scale = total / x.as_slice().len() as f32;
            if self.scale == 0.0 {
                self.scale = 1.0;
            }
            self.fitted = true;
            Ok(())
        }

        fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
            if !self.fitted {
                return Err(NngaError::not_fitted("MockTransformer"));
            }
            let data = x.as_slice().iter().map(|v| v / self.scale).collect();
            Matrix::from_vec(x.n_rows(), x.n_cols(), data)
        }
    }

    #[test]
    fn test_transformer_fit_transform_default() {
        let mut transformer = MockTransformer {
            fitted: false,
            scale: 1.0,
        };
        let x = Matrix::from_vec(2, 2, vec![2.0, 4.0, 6.0, 8.0]).expect("2x2");

        let transformed = transformer.fit_transform(&x).expect("should succeed");
        assert_eq!(transformed.shape(), (2, 2));
        assert!(transformer.fitted);
        assert!((transformed.get(0, 0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_transformer_fit_empty_errors() {
        let mut transformer = MockTransformer {
            fitted: false,
            scale: 1.0,
        };
        let x = Matrix::from_vec(0, 2, vec![]).expect("0x2");
        assert!(transformer.fit_transform(&x).is_err());
        assert!(!transformer.fitted);
    }
}
