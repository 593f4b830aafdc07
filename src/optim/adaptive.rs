//! Per-parameter learning-rate scaling from accumulated squared gradients.

use serde::{Deserialize, Serialize};

use crate::primitives::Vector;

use super::{check_lengths, ensure_state, Optimizer, EPSILON};

/// `RMSprop`: divides the step by a running RMS of recent gradients.
///
/// ```text
/// s_t = ρ * s_{t-1} + (1 - ρ) * g_t²
/// θ_t = θ_{t-1} - η * g_t / (√s_t + ε)
/// ```
///
/// # Example
///
/// ```
/// use nnga::optim::{Optimizer, RMSprop};
/// use nnga::primitives::Vector;
///
/// let mut opt = RMSprop::new(0.001);
/// let mut params = Vector::from_slice(&[1.0]);
/// opt.step(&mut params, &Vector::from_slice(&[2.0]));
/// assert!(params[0] < 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RMSprop {
    learning_rate: f32,
    rho: f32,
    sq_avg: Option<Vec<f32>>,
}

impl RMSprop {
    /// Creates `RMSprop` with ρ = 0.9.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            rho: 0.9,
            sq_avg: None,
        }
    }

    /// Sets the decay rate ρ.
    #[must_use]
    pub fn with_rho(mut self, rho: f32) -> Self {
        self.rho = rho;
        self
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for RMSprop {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let sq_avg = ensure_state(&mut self.sq_avg, params.len());
        for (i, s) in sq_avg.iter_mut().enumerate() {
            let g = gradients[i];
            *s = self.rho * *s + (1.0 - self.rho) * g * g;
            params[i] -= self.learning_rate * g / (s.sqrt() + EPSILON);
        }
    }

    fn reset(&mut self) {
        self.sq_avg = None;
    }
}

/// `Adagrad`: scales each parameter by the root of its summed squared
/// gradients, so frequently updated parameters slow down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adagrad {
    learning_rate: f32,
    initial_accumulator: f32,
    sum_sq: Option<Vec<f32>>,
}

impl Adagrad {
    /// Creates `Adagrad` with an initial accumulator of 0.1.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            initial_accumulator: 0.1,
            sum_sq: None,
        }
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for Adagrad {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let n = params.len();
        if self.sum_sq.as_ref().map_or(true, |s| s.len() != n) {
            self.sum_sq = Some(vec![self.initial_accumulator; n]);
        }
        let Some(sum_sq) = self.sum_sq.as_mut() else {
            return;
        };
        for (i, acc) in sum_sq.iter_mut().enumerate() {
            let g = gradients[i];
            *acc += g * g;
            params[i] -= self.learning_rate * g / (acc.sqrt() + EPSILON);
        }
    }

    fn reset(&mut self) {
        self.sum_sq = None;
    }
}

/// `Adadelta`: replaces the global learning rate with a running RMS of past
/// updates; `learning_rate` only scales the final update.
///
/// ```text
/// E[g²]_t  = ρ * E[g²]_{t-1} + (1 - ρ) * g_t²
/// Δθ_t     = -(√(E[Δθ²]_{t-1} + ε) / √(E[g²]_t + ε)) * g_t
/// E[Δθ²]_t = ρ * E[Δθ²]_{t-1} + (1 - ρ) * Δθ_t²
/// θ_t      = θ_{t-1} + η * Δθ_t
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adadelta {
    learning_rate: f32,
    rho: f32,
    sq_grad: Option<Vec<f32>>,
    sq_delta: Option<Vec<f32>>,
}

impl Adadelta {
    /// Creates `Adadelta` with ρ = 0.95.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            rho: 0.95,
            sq_grad: None,
            sq_delta: None,
        }
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for Adadelta {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let n = params.len();
        ensure_state(&mut self.sq_grad, n);
        ensure_state(&mut self.sq_delta, n);
        let (Some(sq_grad), Some(sq_delta)) = (self.sq_grad.as_mut(), self.sq_delta.as_mut())
        else {
            return;
        };
        let rho = self.rho;
        for i in 0..n {
            let g = gradients[i];
            sq_grad[i] = rho * sq_grad[i] + (1.0 - rho) * g * g;
            let delta = -((sq_delta[i] + EPSILON).sqrt() / (sq_grad[i] + EPSILON).sqrt()) * g;
            sq_delta[i] = rho * sq_delta[i] + (1.0 - rho) * delta * delta;
            params[i] += self.learning_rate * delta;
        }
    }

    fn reset(&mut self) {
        self.sq_grad = None;
        self.sq_delta = None;
    }
}
