//! Feature and target standardization for network training.
//!
//! # Example
//!
//! ```
//! use nnga::prelude::*;
//! use nnga::preprocessing::StandardScaler;
//!
//! let data = Matrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]).expect("3x1");
//! let mut scaler = StandardScaler::new();
//! let scaled = scaler.fit_transform(&data).expect("fit");
//! assert!(scaled.get(1, 0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{NngaError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Transformer;

/// Standard deviations at or below this are treated as constant features.
const MIN_STD: f32 = 1e-10;

/// Standardizes features by removing the mean and scaling to unit variance.
///
/// Constant columns are centered but left unscaled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Option<Vec<f32>>,
    std: Option<Vec<f32>>,
}

impl StandardScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-feature means, once fitted.
    #[must_use]
    pub fn mean(&self) -> Option<&[f32]> {
        self.mean.as_deref()
    }

    /// Per-feature population standard deviations, once fitted.
    #[must_use]
    pub fn std(&self) -> Option<&[f32]> {
        self.std.as_deref()
    }

    /// Returns true if the scaler has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.mean.is_some()
    }
}

impl Transformer for StandardScaler {
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(NngaError::EmptyData(
                "Cannot fit a scaler with zero samples".to_string(),
            ));
        }

        let mut mean = vec![0.0; n_features];
        for i in 0..n_samples {
            for (m, v) in mean.iter_mut().zip(x.row_slice(i)) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n_samples as f32;
        }

        let mut std = vec![0.0; n_features];
        for i in 0..n_samples {
            for (j, v) in x.row_slice(i).iter().enumerate() {
                std[j] += (v - mean[j]).powi(2);
            }
        }
        // Population std (divide by n, not n-1) like sklearn
        for s in &mut std {
            *s = (*s / n_samples as f32).sqrt();
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (Some(mean), Some(std)) = (&self.mean, &self.std) else {
            return Err(NngaError::not_fitted("StandardScaler"));
        };

        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(NngaError::DimensionMismatch {
                expected: format!("{} features", mean.len()),
                actual: format!("{n_features} features"),
            });
        }

        let mut result = Vec::with_capacity(n_samples * n_features);
        for i in 0..n_samples {
            for (j, &v) in x.row_slice(i).iter().enumerate() {
                let centered = v - mean[j];
                result.push(if std[j] > MIN_STD {
                    centered / std[j]
                } else {
                    centered
                });
            }
        }

        Matrix::from_vec(n_samples, n_features, result)
    }
}

/// Standardizes a regression target and maps predictions back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScaler {
    mean: f32,
    std: f32,
}

impl TargetScaler {
    /// Fits on `y`.
    ///
    /// # Errors
    ///
    /// Returns an error if `y` is empty.
    pub fn fit(y: &Vector<f32>) -> Result<Self> {
        if y.is_empty() {
            return Err(NngaError::EmptyData(
                "Cannot fit a target scaler with zero samples".to_string(),
            ));
        }
        let std = y.variance().sqrt();
        Ok(Self {
            mean: y.mean(),
            std: if std > MIN_STD { std } else { 1.0 },
        })
    }

    /// Identity scaling (used for classification targets).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            mean: 0.0,
            std: 1.0,
        }
    }

    /// Maps a raw target value into standardized space.
    #[must_use]
    pub fn transform(&self, v: f32) -> f32 {
        (v - self.mean) / self.std
    }

    /// Maps a standardized value back into target units.
    #[must_use]
    pub fn inverse(&self, v: f32) -> f32 {
        v * self.std + self.mean
    }
}
