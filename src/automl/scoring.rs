//! Task modes and the scorers that rank individuals.
//!
//! Every scorer is oriented so that higher is better; the regression error
//! metrics are negated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NngaError, Result};
use crate::metrics::classification::{accuracy, f1_score, roc_auc_score, to_labels, Average};
use crate::metrics::{neg_mean_absolute_error, neg_mean_squared_error};
use crate::nn::NeuralNetwork;
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;

/// Name of the regression task mode.
pub const REGRESSION: &str = "regression";
/// Name of the classification task mode.
pub const CLASSIFICATION: &str = "classification";

/// Regression vs. classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    /// Continuous target
    Regression,
    /// Binary 0/1 target
    Classification,
}

impl TaskMode {
    /// Parses `"regression"` or `"classification"`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` for anything else.
    ///
    /// # Example
    ///
    /// ```
    /// use nnga::automl::TaskMode;
    ///
    /// assert_eq!(TaskMode::parse("regression").unwrap(), TaskMode::Regression);
    /// assert!(TaskMode::parse("ranking").is_err());
    /// ```
    pub fn parse(mode: &str) -> Result<Self> {
        match mode {
            REGRESSION => Ok(Self::Regression),
            CLASSIFICATION => Ok(Self::Classification),
            other => Err(NngaError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }

    /// Mode name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regression => REGRESSION,
            Self::Classification => CLASSIFICATION,
        }
    }
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infers the task mode from a target column.
///
/// A column whose distinct values are exactly {0, 1} is classification;
/// anything else, including a constant 0 or 1 column, is regression.
#[must_use]
pub fn regression_or_classification(target: &Vector<f32>) -> TaskMode {
    let (mut zeros, mut ones) = (false, false);
    for v in target.iter() {
        if v == 0.0 {
            zeros = true;
        } else if v == 1.0 {
            ones = true;
        } else {
            return TaskMode::Regression;
        }
    }
    if zeros && ones {
        TaskMode::Classification
    } else {
        TaskMode::Regression
    }
}

/// Fitness function for one task mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// −MAE (regression)
    NegMae,
    /// −MSE (regression)
    NegMse,
    /// Binary F1 of the positive class (classification)
    F1,
    /// ROC-AUC on positive-class probabilities (classification)
    RocAuc,
    /// Accuracy (classification)
    Accuracy,
}

impl Scorer {
    /// Parses a regression metric name: `neg_mae` (alias `mae`) or
    /// `neg_mse` (alias `mse`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for other names.
    pub fn regression(name: &str) -> Result<Self> {
        match name {
            "neg_mae" | "mae" | "neg_mean_absolute_error" => Ok(Self::NegMae),
            "neg_mse" | "mse" | "neg_mean_squared_error" => Ok(Self::NegMse),
            other => Err(NngaError::invalid_param(
                "reg_metric",
                other,
                "one of neg_mae, neg_mse",
            )),
        }
    }

    /// Parses a classification metric name: `f1`, `roc_auc` or `accuracy`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for other names.
    pub fn classification(name: &str) -> Result<Self> {
        match name {
            "f1" => Ok(Self::F1),
            "roc_auc" => Ok(Self::RocAuc),
            "accuracy" => Ok(Self::Accuracy),
            other => Err(NngaError::invalid_param(
                "clf_metric",
                other,
                "one of f1, roc_auc, accuracy",
            )),
        }
    }

    /// Mode this scorer applies to.
    #[must_use]
    pub fn mode(self) -> TaskMode {
        match self {
            Self::NegMae | Self::NegMse => TaskMode::Regression,
            Self::F1 | Self::RocAuc | Self::Accuracy => TaskMode::Classification,
        }
    }

    /// Whether the scorer consumes probabilities instead of labels.
    #[must_use]
    pub fn needs_proba(self) -> bool {
        self == Self::RocAuc
    }

    /// Scores predictions against validation labels.
    ///
    /// `y_pred` holds probabilities when [`Self::needs_proba`] is true.
    ///
    /// # Errors
    ///
    /// Returns `EmptyData` for empty inputs or `DimensionMismatch` if the
    /// lengths differ.
    pub fn score_predictions(self, y_true: &Vector<f32>, y_pred: &Vector<f32>) -> Result<f64> {
        if y_true.is_empty() {
            return Err(NngaError::EmptyData(format!("cannot score {self} on zero samples")));
        }
        if y_pred.len() != y_true.len() {
            return Err(NngaError::DimensionMismatch {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{}", y_pred.len()),
            });
        }
        let score = match self {
            Self::NegMae => neg_mean_absolute_error(y_pred, y_true),
            Self::NegMse => neg_mean_squared_error(y_pred, y_true),
            Self::F1 => f1_score(
                &to_labels(y_pred.as_slice()),
                &to_labels(y_true.as_slice()),
                Average::Binary,
            ),
            Self::Accuracy => accuracy(
                &to_labels(y_pred.as_slice()),
                &to_labels(y_true.as_slice()),
            ),
            Self::RocAuc => roc_auc_score(y_pred.as_slice(), &to_labels(y_true.as_slice())),
        };
        Ok(f64::from(score))
    }

    /// Predicts `x` with a fitted network and scores against `y`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` if the network's mode differs from the
    /// scorer's, or any prediction error.
    pub fn score(self, model: &NeuralNetwork, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f64> {
        if model.mode() != self.mode() {
            return Err(NngaError::InvalidMode {
                mode: model.mode().to_string(),
            });
        }
        let y_pred = if self.needs_proba() {
            model.predict_proba(x)?
        } else {
            model.predict(x)?
        };
        self.score_predictions(y, &y_pred)
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NegMae => "neg_mae",
            Self::NegMse => "neg_mse",
            Self::F1 => "f1",
            Self::RocAuc => "roc_auc",
            Self::Accuracy => "accuracy",
        })
    }
}

/// Picks the configured scorer for `mode`.
///
/// `None` stands for a mode that was never determined.
///
/// # Errors
///
/// Returns `InvalidMode` when `mode` is `None`, or a metric-name error.
pub fn scorer_for(mode: Option<TaskMode>, reg_metric: &str, clf_metric: &str) -> Result<Scorer> {
    match mode {
        Some(TaskMode::Regression) => Scorer::regression(reg_metric),
        Some(TaskMode::Classification) => Scorer::classification(clf_metric),
        None => Err(NngaError::InvalidMode {
            mode: "None".to_string(),
        }),
    }
}
