//! First-order optimizers for mini-batch gradient descent.
//!
//! Every optimizer works on a flat parameter [`Vector`] and implements the
//! [`Optimizer`] trait, so a network can swap them by name through
//! [`OptimizerKind`].
//!
//! # Available Optimizers
//!
//! - [`SGD`] - Stochastic Gradient Descent with optional momentum
//! - [`RMSprop`] - Root-mean-square propagation
//! - [`Adagrad`] - Accumulated squared-gradient scaling
//! - [`Adadelta`] - Adagrad extension with a running update scale
//! - [`Adam`] - Adaptive Moment Estimation
//! - [`Adamax`] - Adam with an infinity-norm second moment
//! - [`Nadam`] - Adam with Nesterov momentum
//!
//! ```
//! use nnga::optim::{Optimizer, SGD};
//! use nnga::primitives::Vector;
//!
//! let mut optimizer = SGD::new(0.01);
//! let mut params = Vector::from_slice(&[1.0, 2.0, 3.0]);
//! let gradients = Vector::from_slice(&[0.1, 0.2, 0.3]);
//!
//! optimizer.step(&mut params, &gradients);
//! assert!((params[0] - 0.999).abs() < 1e-6);
//! ```

mod adaptive;
mod stochastic;

pub use adaptive::{Adadelta, Adagrad, RMSprop};
pub use stochastic::{Adam, Adamax, Nadam, SGD};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NngaError, Result};
use crate::primitives::Vector;

/// Numerical-stability constant shared by the adaptive optimizers.
pub(crate) const EPSILON: f32 = 1e-7;

/// Unified trait for stochastic optimizers.
///
/// Implementors keep their own per-parameter state (velocity, moment
/// estimates) sized lazily on the first `step`.
pub trait Optimizer: Send {
    /// Updates `params` in place from the current mini-batch gradient.
    ///
    /// # Panics
    ///
    /// Panics if `params` and `gradients` have different lengths.
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>);

    /// Resets the optimizer state (momentum, history, etc.).
    fn reset(&mut self);
}

/// Optimizer names accepted by the hyperparameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// Plain SGD
    Sgd,
    /// RMSprop
    Rmsprop,
    /// Adagrad
    Adagrad,
    /// Adadelta
    Adadelta,
    /// Nadam
    Nadam,
    /// Adamax
    Adamax,
    /// Adam
    Adam,
}

impl OptimizerKind {
    /// All kinds in grid order.
    pub const ALL: [Self; 7] = [
        Self::Sgd,
        Self::Rmsprop,
        Self::Adagrad,
        Self::Adadelta,
        Self::Nadam,
        Self::Adamax,
        Self::Adam,
    ];

    /// Parses a grid name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for unknown names.
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                NngaError::invalid_param(
                    "optimizer",
                    name,
                    "one of sgd, rmsprop, adagrad, adadelta, nadam, adamax, adam",
                )
            })
    }

    /// Grid name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sgd => "sgd",
            Self::Rmsprop => "rmsprop",
            Self::Adagrad => "adagrad",
            Self::Adadelta => "adadelta",
            Self::Nadam => "nadam",
            Self::Adamax => "adamax",
            Self::Adam => "adam",
        }
    }

    /// Conventional default learning rate for this kind.
    #[must_use]
    pub fn default_learning_rate(self) -> f32 {
        match self {
            Self::Sgd | Self::Adagrad => 0.01,
            Self::Rmsprop | Self::Adam => 0.001,
            Self::Adadelta => 1.0,
            Self::Nadam | Self::Adamax => 0.002,
        }
    }

    /// Builds a fresh optimizer; `None` uses [`Self::default_learning_rate`].
    #[must_use]
    pub fn build(self, learning_rate: Option<f32>) -> Box<dyn Optimizer> {
        let lr = learning_rate.unwrap_or_else(|| self.default_learning_rate());
        match self {
            Self::Sgd => Box::new(SGD::new(lr)),
            Self::Rmsprop => Box::new(RMSprop::new(lr)),
            Self::Adagrad => Box::new(Adagrad::new(lr)),
            Self::Adadelta => Box::new(Adadelta::new(lr)),
            Self::Nadam => Box::new(Nadam::new(lr)),
            Self::Adamax => Box::new(Adamax::new(lr)),
            Self::Adam => Box::new(Adam::new(lr)),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn check_lengths(params: &Vector<f32>, gradients: &Vector<f32>) {
    assert_eq!(
        params.len(),
        gradients.len(),
        "Parameters and gradients must have same length"
    );
}

/// Returns `state` resized to `n` zeros if it is missing or stale.
pub(crate) fn ensure_state(state: &mut Option<Vec<f32>>, n: usize) -> &mut Vec<f32> {
    if state.as_ref().map_or(true, |s| s.len() != n) {
        *state = Some(vec![0.0; n]);
    }
    state.get_or_insert_with(Vec::new)
}

#[cfg(test)]
#[path = "stochastic_tests.rs"]
mod tests;
