//! nnga: genetic-algorithm hyperparameter search for neural networks.
//!
//! nnga evolves neural-network configurations (activation, optimizer,
//! hidden units, hidden layer count) with a genetic algorithm, scores each
//! candidate on held-out data, and refits the winner on every row. The
//! search is exposed as a `fit(df, target)` / `predict(df, target)` pipeline
//! stage.
//!
//! # Quick Start
//!
//! ```
//! use nnga::prelude::*;
//! use nnga::automl::{HyperParam, ParamGrid};
//!
//! // y = 3x - 1
//! let x: Vec<f32> = (0..30).map(|i| i as f32 / 6.0).collect();
//! let y: Vec<f32> = x.iter().map(|v| 3.0 * v - 1.0).collect();
//! let df = DataFrame::new(vec![
//!     ("x".to_string(), Vector::from_vec(x)),
//!     ("y".to_string(), Vector::from_vec(y)),
//! ]).unwrap();
//!
//! let grid = ParamGrid::new()
//!     .with_param("activation", HyperParam::categorical(["tanh", "relu"]))
//!     .with_param("units", HyperParam::integer(2..=8));
//! let config = GeneticConfig::default()
//!     .with_param_grid(grid)
//!     .with_pop_size(4)
//!     .with_n_generations(1)
//!     .with_epochs(20);
//!
//! let mut search = GeneticSearch::new(config).unwrap();
//! search.fit(&df, "y").unwrap();
//! assert_eq!(search.mode(), Some(TaskMode::Regression));
//! assert_eq!(search.predict(&df, "y").unwrap().len(), 30);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`data`]: DataFrame for named columns
//! - [`automl`]: Genetic search, parameter grids, individuals and scoring
//! - [`nn`]: Dense neural network regressor/classifier
//! - [`optim`]: Optimizers (SGD, RMSprop, Adagrad, Adadelta, Adam, Adamax, Nadam)
//! - [`metrics`]: Evaluation metrics
//! - [`model_selection`]: Cross-validation and train/test splitting
//! - [`preprocessing`]: Feature and target scalers

pub mod automl;
pub mod data;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod nn;
pub mod optim;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod traits;

pub use error::{NngaError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::{Estimator, PipelineAdaptor, Transformer};
