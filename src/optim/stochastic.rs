//! Momentum-style optimizers: SGD and the Adam family.

use serde::{Deserialize, Serialize};

use crate::primitives::Vector;

use super::{check_lengths, ensure_state, Optimizer, EPSILON};

/// Stochastic Gradient Descent (SGD) optimizer with optional momentum.
///
/// # Update Rule
///
/// Without momentum: `θ = θ - η * ∇f(θ)`
///
/// With momentum:
/// ```text
/// v = γ * v + η * ∇f(θ)
/// θ = θ - v
/// ```
///
/// # Example
///
/// ```
/// use nnga::optim::{Optimizer, SGD};
/// use nnga::primitives::Vector;
///
/// let mut optimizer = SGD::new(0.1);
/// let mut params = Vector::from_slice(&[1.0, 2.0]);
/// let gradients = Vector::from_slice(&[0.5, 1.0]);
///
/// optimizer.step(&mut params, &gradients);
///
/// // params = [1.0 - 0.1*0.5, 2.0 - 0.1*1.0] = [0.95, 1.9]
/// assert!((params[0] - 0.95).abs() < 1e-6);
/// assert!((params[1] - 1.9).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SGD {
    /// Learning rate (step size)
    learning_rate: f32,
    /// Momentum coefficient (0.0 = no momentum)
    momentum: f32,
    /// Velocity vectors for momentum
    velocity: Option<Vec<f32>>,
}

impl SGD {
    /// Creates a new SGD optimizer with the given learning rate.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            momentum: 0.0,
            velocity: None,
        }
    }

    /// Sets the momentum coefficient (typical: 0.9).
    #[must_use]
    pub fn with_momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Returns the momentum coefficient.
    #[must_use]
    pub fn momentum(&self) -> f32 {
        self.momentum
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let n = params.len();

        if self.momentum > 0.0 {
            let velocity = ensure_state(&mut self.velocity, n);
            for i in 0..n {
                velocity[i] = self.momentum * velocity[i] + self.learning_rate * gradients[i];
                params[i] -= velocity[i];
            }
        } else {
            for i in 0..n {
                params[i] -= self.learning_rate * gradients[i];
            }
        }
    }

    fn reset(&mut self) {
        self.velocity = None;
    }
}

/// Shared first/second moment state of the Adam family.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Moments {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    m: Option<Vec<f32>>,
    v: Option<Vec<f32>>,
    t: i32,
}

impl Moments {
    fn new(learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: EPSILON,
            m: None,
            v: None,
            t: 0,
        }
    }

    fn reset(&mut self) {
        self.m = None;
        self.v = None;
        self.t = 0;
    }
}

/// Adam (Adaptive Moment Estimation) optimizer.
///
/// ```text
/// m_t = β₁ * m_{t-1} + (1 - β₁) * g_t
/// v_t = β₂ * v_{t-1} + (1 - β₂) * g_t²
/// m̂_t = m_t / (1 - β₁^t)
/// v̂_t = v_t / (1 - β₂^t)
/// θ_t = θ_{t-1} - α * m̂_t / (√v̂_t + ε)
/// ```
///
/// # Example
///
/// ```
/// use nnga::optim::{Adam, Optimizer};
/// use nnga::primitives::Vector;
///
/// let mut optimizer = Adam::new(0.001);
/// let mut params = Vector::from_slice(&[1.0, 2.0]);
/// optimizer.step(&mut params, &Vector::from_slice(&[0.1, 0.2]));
/// // The first Adam step moves each parameter by about the learning rate.
/// assert!((params[0] - 0.999).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adam {
    state: Moments,
}

impl Adam {
    /// Creates Adam with β₁ = 0.9, β₂ = 0.999.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            state: Moments::new(learning_rate),
        }
    }

    /// Sets β₁.
    #[must_use]
    pub fn with_beta1(mut self, beta1: f32) -> Self {
        self.state.beta1 = beta1;
        self
    }

    /// Sets β₂.
    #[must_use]
    pub fn with_beta2(mut self, beta2: f32) -> Self {
        self.state.beta2 = beta2;
        self
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.state.learning_rate
    }

    /// Number of steps taken since the last reset.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.state.t as usize
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let n = params.len();
        let s = &mut self.state;
        s.t += 1;
        let bias1 = 1.0 - s.beta1.powi(s.t);
        let bias2 = 1.0 - s.beta2.powi(s.t);
        let (beta1, beta2, lr, eps) = (s.beta1, s.beta2, s.learning_rate, s.epsilon);

        ensure_state(&mut s.m, n);
        ensure_state(&mut s.v, n);
        let (Some(m), Some(v)) = (s.m.as_mut(), s.v.as_mut()) else {
            return;
        };
        for i in 0..n {
            let g = gradients[i];
            m[i] = beta1 * m[i] + (1.0 - beta1) * g;
            v[i] = beta2 * v[i] + (1.0 - beta2) * g * g;
            let m_hat = m[i] / bias1;
            let v_hat = v[i] / bias2;
            params[i] -= lr * m_hat / (v_hat.sqrt() + eps);
        }
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

/// Adamax: Adam with the second moment replaced by an exponentially
/// weighted infinity norm.
///
/// ```text
/// u_t = max(β₂ * u_{t-1}, |g_t|)
/// θ_t = θ_{t-1} - (α / (1 - β₁^t)) * m_t / (u_t + ε)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adamax {
    state: Moments,
}

impl Adamax {
    /// Creates Adamax with β₁ = 0.9, β₂ = 0.999.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            state: Moments::new(learning_rate),
        }
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.state.learning_rate
    }
}

impl Optimizer for Adamax {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let n = params.len();
        let s = &mut self.state;
        s.t += 1;
        let step_size = s.learning_rate / (1.0 - s.beta1.powi(s.t));
        let (beta1, beta2, eps) = (s.beta1, s.beta2, s.epsilon);

        ensure_state(&mut s.m, n);
        ensure_state(&mut s.v, n);
        let (Some(m), Some(u)) = (s.m.as_mut(), s.v.as_mut()) else {
            return;
        };
        for i in 0..n {
            let g = gradients[i];
            m[i] = beta1 * m[i] + (1.0 - beta1) * g;
            u[i] = (beta2 * u[i]).max(g.abs());
            params[i] -= step_size * m[i] / (u[i] + eps);
        }
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

/// Nadam: Adam with a Nesterov look-ahead on the first moment.
///
/// ```text
/// m̂_t = β₁ * m_t / (1 - β₁^{t+1}) + (1 - β₁) * g_t / (1 - β₁^t)
/// θ_t = θ_{t-1} - α * m̂_t / (√v̂_t + ε)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nadam {
    state: Moments,
}

impl Nadam {
    /// Creates Nadam with β₁ = 0.9, β₂ = 0.999.
    #[must_use]
    pub fn new(learning_rate: f32) -> Self {
        Self {
            state: Moments::new(learning_rate),
        }
    }

    /// Returns the learning rate.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.state.learning_rate
    }
}

impl Optimizer for Nadam {
    fn step(&mut self, params: &mut Vector<f32>, gradients: &Vector<f32>) {
        check_lengths(params, gradients);
        let n = params.len();
        let s = &mut self.state;
        s.t += 1;
        let bias1 = 1.0 - s.beta1.powi(s.t);
        let bias1_next = 1.0 - s.beta1.powi(s.t + 1);
        let bias2 = 1.0 - s.beta2.powi(s.t);
        let (beta1, beta2, lr, eps) = (s.beta1, s.beta2, s.learning_rate, s.epsilon);

        ensure_state(&mut s.m, n);
        ensure_state(&mut s.v, n);
        let (Some(m), Some(v)) = (s.m.as_mut(), s.v.as_mut()) else {
            return;
        };
        for i in 0..n {
            let g = gradients[i];
            m[i] = beta1 * m[i] + (1.0 - beta1) * g;
            v[i] = beta2 * v[i] + (1.0 - beta2) * g * g;
            let m_hat = beta1 * m[i] / bias1_next + (1.0 - beta1) * g / bias1;
            let v_hat = v[i] / bias2;
            params[i] -= lr * m_hat / (v_hat.sqrt() + eps);
        }
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
