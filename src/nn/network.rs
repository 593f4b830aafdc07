//! Dense multi-layer perceptron trained by mini-batch back-propagation.
//!
//! All weights and biases live in one flat parameter [`Vector`] so any
//! [`Optimizer`](crate::optim::Optimizer) can update them in a single
//! `step` call. Layer `l` occupies `n_out * n_in` row-major weights
//! followed by `n_out` biases.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::activation::{sigmoid, Activation};
use super::init::{kaiming_uniform, xavier_uniform};
use crate::automl::TaskMode;
use crate::error::{NngaError, Result};
use crate::metrics::classification::{accuracy, to_labels};
use crate::metrics::r_squared;
use crate::optim::OptimizerKind;
use crate::preprocessing::{StandardScaler, TargetScaler};
use crate::primitives::{Matrix, Vector};
use crate::traits::{Estimator, Transformer};

/// Location of one dense layer inside the flat parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Layer {
    n_in: usize,
    n_out: usize,
    offset: usize,
}

impl Layer {
    fn n_weights(self) -> usize {
        self.n_in * self.n_out
    }

    fn n_params(self) -> usize {
        self.n_weights() + self.n_out
    }

    fn bias_offset(self) -> usize {
        self.offset + self.n_weights()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Fitted {
    layers: Vec<Layer>,
    params: Vector<f32>,
    scaler: StandardScaler,
    target: TargetScaler,
    final_loss: f32,
}

/// Feed-forward neural network regressor/classifier.
///
/// Regression uses a linear output with squared-error loss on a
/// standardized target; classification uses a sigmoid output with binary
/// cross-entropy and predicts 0/1 labels.
///
/// # Example
///
/// ```
/// use nnga::prelude::*;
/// use nnga::nn::{Activation, NeuralNetwork};
/// use nnga::optim::OptimizerKind;
///
/// let x = Matrix::from_vec(8, 1, (0..8).map(|i| i as f32).collect()).unwrap();
/// let y = Vector::from_vec((0..8).map(|i| 2.0 * i as f32 + 1.0).collect());
///
/// let mut nn = NeuralNetwork::new(TaskMode::Regression)
///     .with_activation(Activation::Tanh)
///     .with_optimizer(OptimizerKind::Adam)
///     .with_units(8)
///     .with_learning_rate(0.01)
///     .with_epochs(300)
///     .with_seed(1);
/// nn.fit(&x, &y).unwrap();
/// assert!(nn.score(&x, &y).unwrap() > 0.9);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralNetwork {
    mode: TaskMode,
    activation: Activation,
    optimizer: OptimizerKind,
    units: usize,
    hidden_layers: usize,
    epochs: usize,
    batch_size: usize,
    learning_rate: Option<f32>,
    seed: u64,
    fitted: Option<Fitted>,
}

impl NeuralNetwork {
    /// Creates an unfitted network: one hidden layer of 16 relu units,
    /// Adam, 100 epochs, batch size 32, seed 0.
    #[must_use]
    pub fn new(mode: TaskMode) -> Self {
        Self {
            mode,
            activation: Activation::Relu,
            optimizer: OptimizerKind::Adam,
            units: 16,
            hidden_layers: 1,
            epochs: 100,
            batch_size: 32,
            learning_rate: None,
            seed: 0,
            fitted: None,
        }
    }

    /// Sets the hidden-layer activation.
    #[must_use]
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Sets the optimizer.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the number of units in every hidden layer.
    #[must_use]
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    /// Sets the number of hidden layers.
    #[must_use]
    pub fn with_hidden_layers(mut self, hidden_layers: usize) -> Self {
        self.hidden_layers = hidden_layers;
        self
    }

    /// Sets the number of passes over the training data.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the mini-batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Overrides the optimizer's default learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = Some(learning_rate);
        self
    }

    /// Sets the seed for weight init and batch shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Task mode.
    #[must_use]
    pub fn mode(&self) -> TaskMode {
        self.mode
    }

    /// Hidden-layer activation.
    #[must_use]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Optimizer kind.
    #[must_use]
    pub fn optimizer(&self) -> OptimizerKind {
        self.optimizer
    }

    /// Units per hidden layer.
    #[must_use]
    pub fn units(&self) -> usize {
        self.units
    }

    /// Number of hidden layers.
    #[must_use]
    pub fn hidden_layers(&self) -> usize {
        self.hidden_layers
    }

    /// Returns true once `fit` has succeeded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Total number of trainable parameters, once fitted.
    #[must_use]
    pub fn n_parameters(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.params.len())
    }

    /// Training loss of the last epoch, once fitted.
    #[must_use]
    pub fn final_loss(&self) -> Option<f32> {
        self.fitted.as_ref().map(|f| f.final_loss)
    }

    /// Positive-class probabilities (classification only).
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`, `InvalidHyperparameter` in
    /// regression mode, or `DimensionMismatch` for a wrong feature count.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        if self.mode != TaskMode::Classification {
            return Err(NngaError::invalid_param(
                "mode",
                self.mode,
                "classification for predict_proba",
            ));
        }
        self.forward_output(x)
    }

    fn validate(&self) -> Result<()> {
        if self.units == 0 {
            return Err(NngaError::invalid_param("units", self.units, ">= 1"));
        }
        if self.epochs == 0 {
            return Err(NngaError::invalid_param("epochs", self.epochs, ">= 1"));
        }
        if self.batch_size == 0 {
            return Err(NngaError::invalid_param("batch_size", self.batch_size, ">= 1"));
        }
        Ok(())
    }

    fn build_layers(&self, n_features: usize) -> Vec<Layer> {
        let mut layers = Vec::with_capacity(self.hidden_layers + 1);
        let mut n_in = n_features;
        let mut offset = 0;
        for _ in 0..self.hidden_layers {
            let layer = Layer {
                n_in,
                n_out: self.units,
                offset,
            };
            offset += layer.n_params();
            n_in = self.units;
            layers.push(layer);
        }
        layers.push(Layer {
            n_in,
            n_out: 1,
            offset,
        });
        layers
    }

    fn init_params(&self, layers: &[Layer], rng: &mut StdRng) -> Vector<f32> {
        let total = layers.iter().map(|l| l.n_params()).sum();
        let mut params = Vec::with_capacity(total);
        for (idx, layer) in layers.iter().enumerate() {
            let is_output = idx + 1 == layers.len();
            let weights = if !is_output && self.activation.prefers_he_init() {
                kaiming_uniform(layer.n_weights(), layer.n_in, rng)
            } else {
                xavier_uniform(layer.n_weights(), layer.n_in, layer.n_out, rng)
            };
            params.extend(weights);
            params.extend(std::iter::repeat(0.0).take(layer.n_out));
        }
        Vector::from_vec(params)
    }

    /// Runs the network on standardized rows; returns every layer's
    /// activations, input first. The last entry is the raw output
    /// (sigmoid applied for classification).
    fn forward(&self, layers: &[Layer], params: &[f32], input: Vec<f32>, n: usize) -> Vec<Vec<f32>> {
        let mut activations = Vec::with_capacity(layers.len() + 1);
        activations.push(input);
        for (idx, layer) in layers.iter().enumerate() {
            let is_output = idx + 1 == layers.len();
            let weights = &params[layer.offset..layer.bias_offset()];
            let biases = &params[layer.bias_offset()..layer.offset + layer.n_params()];
            let prev = &activations[idx];

            let mut out = vec![0.0; n * layer.n_out];
            for b in 0..n {
                let row = &prev[b * layer.n_in..(b + 1) * layer.n_in];
                for o in 0..layer.n_out {
                    let w = &weights[o * layer.n_in..(o + 1) * layer.n_in];
                    let z: f32 = row.iter().zip(w).map(|(a, w)| a * w).sum::<f32>() + biases[o];
                    out[b * layer.n_out + o] = if !is_output {
                        self.activation.apply(z)
                    } else if self.mode == TaskMode::Classification {
                        sigmoid(z)
                    } else {
                        z
                    };
                }
            }
            activations.push(out);
        }
        activations
    }

    /// Accumulates the batch gradient of the loss into `grads`; returns the
    /// batch loss.
    fn backward(
        &self,
        layers: &[Layer],
        params: &[f32],
        activations: &[Vec<f32>],
        targets: &[f32],
        grads: &mut [f32],
    ) -> f32 {
        let n = targets.len();
        let output = &activations[layers.len()];

        // Linear+MSE and sigmoid+BCE share the output delta (ŷ - y).
        let mut delta: Vec<f32> = output
            .iter()
            .zip(targets)
            .map(|(p, t)| (p - t) / n as f32)
            .collect();
        let loss = match self.mode {
            TaskMode::Regression => {
                output
                    .iter()
                    .zip(targets)
                    .map(|(p, t)| 0.5 * (p - t).powi(2))
                    .sum::<f32>()
                    / n as f32
            }
            TaskMode::Classification => {
                output
                    .iter()
                    .zip(targets)
                    .map(|(p, t)| {
                        let p = p.clamp(1e-7, 1.0 - 1e-7);
                        -(t * p.ln() + (1.0 - t) * (1.0 - p).ln())
                    })
                    .sum::<f32>()
                    / n as f32
            }
        };

        for (idx, layer) in layers.iter().enumerate().rev() {
            let prev = &activations[idx];
            let weights = &params[layer.offset..layer.bias_offset()];
            let (w_grad, rest) = grads[layer.offset..].split_at_mut(layer.n_weights());
            let b_grad = &mut rest[..layer.n_out];

            for b in 0..n {
                let row = &prev[b * layer.n_in..(b + 1) * layer.n_in];
                for o in 0..layer.n_out {
                    let d = delta[b * layer.n_out + o];
                    if d == 0.0 {
                        continue;
                    }
                    b_grad[o] += d;
                    let g = &mut w_grad[o * layer.n_in..(o + 1) * layer.n_in];
                    for (gi, a) in g.iter_mut().zip(row) {
                        *gi += d * a;
                    }
                }
            }

            if idx == 0 {
                break;
            }
            let mut prev_delta = vec![0.0; n * layer.n_in];
            for b in 0..n {
                let pd = &mut prev_delta[b * layer.n_in..(b + 1) * layer.n_in];
                for o in 0..layer.n_out {
                    let d = delta[b * layer.n_out + o];
                    if d == 0.0 {
                        continue;
                    }
                    let w = &weights[o * layer.n_in..(o + 1) * layer.n_in];
                    for (p, w) in pd.iter_mut().zip(w) {
                        *p += d * w;
                    }
                }
            }
            for (p, a) in prev_delta.iter_mut().zip(prev) {
                *p *= self.activation.derivative(*a);
            }
            delta = prev_delta;
        }

        loss
    }

    fn fitted(&self) -> Result<&Fitted> {
        self.fitted
            .as_ref()
            .ok_or_else(|| NngaError::not_fitted("NeuralNetwork"))
    }

    /// Output-layer values for `x` in model space (standardized target or
    /// probability).
    fn forward_output(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        let fitted = self.fitted()?;
        let scaled = fitted.scaler.transform(x)?;
        let n = scaled.n_rows();
        let mut activations =
            self.forward(&fitted.layers, fitted.params.as_slice(), scaled.as_slice().to_vec(), n);
        Ok(Vector::from_vec(activations.pop().unwrap_or_default()))
    }
}

impl Estimator for NeuralNetwork {
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()> {
        self.validate()?;
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 || n_features == 0 {
            return Err(NngaError::EmptyData(format!(
                "cannot fit a network on a {n_samples}x{n_features} matrix"
            )));
        }
        if y.len() != n_samples {
            return Err(NngaError::DimensionMismatch {
                expected: format!("{n_samples} targets"),
                actual: format!("{} targets", y.len()),
            });
        }

        let target = match self.mode {
            TaskMode::Regression => TargetScaler::fit(y)?,
            TaskMode::Classification => {
                if let Some(bad) = y.iter().find(|&v| v != 0.0 && v != 1.0) {
                    return Err(NngaError::invalid_param("y", bad, "class labels 0 or 1"));
                }
                TargetScaler::identity()
            }
        };
        let targets: Vec<f32> = y.iter().map(|v| target.transform(v)).collect();

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(x)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let layers = self.build_layers(n_features);
        let mut params = self.init_params(&layers, &mut rng);
        let mut optimizer = self.optimizer.build(self.learning_rate);

        let batch_size = self.batch_size.min(n_samples);
        let mut order: Vec<usize> = (0..n_samples).collect();
        let mut grads = Vector::zeros(params.len());
        let mut final_loss = f32::NAN;

        for epoch in 0..self.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            for batch in order.chunks(batch_size) {
                let mut input = Vec::with_capacity(batch.len() * n_features);
                for &i in batch {
                    input.extend_from_slice(scaled.row_slice(i));
                }
                let batch_targets: Vec<f32> = batch.iter().map(|&i| targets[i]).collect();

                let activations = self.forward(&layers, params.as_slice(), input, batch.len());
                grads.as_mut_slice().fill(0.0);
                let loss = self.backward(
                    &layers,
                    params.as_slice(),
                    &activations,
                    &batch_targets,
                    grads.as_mut_slice(),
                );
                optimizer.step(&mut params, &grads);
                epoch_loss += loss * batch.len() as f32;
            }
            final_loss = epoch_loss / n_samples as f32;

            if !final_loss.is_finite() || !params.is_finite() {
                return Err(NngaError::Training(format!(
                    "{} network with {} optimizer diverged at epoch {epoch}",
                    self.activation, self.optimizer
                )));
            }
            trace!(epoch, loss = final_loss, "epoch complete");
        }

        self.fitted = Some(Fitted {
            layers,
            params,
            scaler,
            target,
            final_loss,
        });
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vector<f32>> {
        let raw = self.forward_output(x)?;
        let target = self.fitted()?.target;
        let out = match self.mode {
            TaskMode::Regression => raw.iter().map(|v| target.inverse(v)).collect(),
            TaskMode::Classification => raw
                .iter()
                .map(|p| if p >= 0.5 { 1.0 } else { 0.0 })
                .collect(),
        };
        Ok(Vector::from_vec(out))
    }

    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<f32> {
        let y_pred = self.predict(x)?;
        if y_pred.len() != y.len() {
            return Err(NngaError::DimensionMismatch {
                expected: format!("{} targets", y_pred.len()),
                actual: format!("{} targets", y.len()),
            });
        }
        Ok(match self.mode {
            TaskMode::Regression => r_squared(&y_pred, y),
            TaskMode::Classification => {
                accuracy(&to_labels(y_pred.as_slice()), &to_labels(y.as_slice()))
            }
        })
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
