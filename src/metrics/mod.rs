//! Evaluation metrics for ML models.
//!
//! Regression metrics (R², MSE, MAE and their negated "higher is better"
//! forms) live here; classification metrics live in [`classification`].

pub mod classification;

use crate::primitives::Vector;

/// Computes the coefficient of determination (R²).
///
/// R² = 1 - (`SS_res` / `SS_tot`); returns 0.0 for a constant target.
///
/// # Examples
///
/// ```
/// use nnga::metrics::r_squared;
/// use nnga::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// assert!(r_squared(&y_pred, &y_true) > 0.9);
/// ```
///
/// # Panics
///
/// Panics if vectors have different lengths.
#[must_use]
pub fn r_squared(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");

    let y_mean = y_true.mean();
    let ss_res: f32 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f32 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }

    1.0 - (ss_res / ss_tot)
}

/// Computes the Mean Squared Error (MSE).
///
/// # Examples
///
/// ```
/// use nnga::metrics::mse;
/// use nnga::primitives::Vector;
///
/// let y_true = Vector::from_slice(&[3.0, -0.5, 2.0, 7.0]);
/// let y_pred = Vector::from_slice(&[2.5, 0.0, 2.0, 8.0]);
/// assert!((mse(&y_pred, &y_true) - 0.375).abs() < 1e-6);
/// ```
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mse(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    mean_error(y_pred, y_true, |d| d * d)
}

/// Computes the Mean Absolute Error (MAE).
///
/// # Panics
///
/// Panics if vectors have different lengths or are empty.
#[must_use]
pub fn mae(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    mean_error(y_pred, y_true, f32::abs)
}

/// Negated MAE, so that larger is better.
#[must_use]
pub fn neg_mean_absolute_error(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    -mae(y_pred, y_true)
}

/// Negated MSE, so that larger is better.
#[must_use]
pub fn neg_mean_squared_error(y_pred: &Vector<f32>, y_true: &Vector<f32>) -> f32 {
    -mse(y_pred, y_true)
}

fn mean_error(y_pred: &Vector<f32>, y_true: &Vector<f32>, f: impl Fn(f32) -> f32) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Vectors must have same length");
    assert!(!y_true.is_empty(), "Vectors cannot be empty");

    let total: f32 = y_true.iter().zip(y_pred.iter()).map(|(t, p)| f(t - p)).sum();
    total / y_true.len() as f32
}
