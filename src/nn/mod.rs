//! Neural network estimator searched over by the genetic algorithm.
//!
//! - **Activations**: [`Activation`] (sigmoid, tanh, relu, elu)
//! - **Model**: [`NeuralNetwork`], a dense MLP implementing
//!   [`Estimator`](crate::traits::Estimator)
//!
//! # Example
//!
//! ```
//! use nnga::prelude::*;
//! use nnga::nn::{Activation, NeuralNetwork};
//!
//! let nn = NeuralNetwork::new(TaskMode::Classification)
//!     .with_activation(Activation::Elu)
//!     .with_units(32)
//!     .with_hidden_layers(2);
//! assert!(!nn.is_fitted());
//! ```
//!
//! # References
//!
//! - Glorot, X., & Bengio, Y. (2010). Understanding the difficulty of training
//!   deep feedforward neural networks. AISTATS.
//! - He, K., et al. (2015). Delving deep into rectifiers. ICCV.

mod activation;
mod init;
mod network;

pub use activation::{sigmoid, Activation};
pub use network::NeuralNetwork;
