//! Genetic hyperparameter search for neural networks.
//!
//! A [`ParamGrid`] names the genes (activation, optimizer, hidden units,
//! hidden layer count) and their alleles. [`GeneticSearch`] evolves a
//! population of [`Individual`]s over that grid, scoring each one by
//! training a [`NeuralNetwork`](crate::nn::NeuralNetwork) and applying the
//! mode's [`Scorer`]. Fitting and prediction go through
//! [`PipelineAdaptor`](crate::traits::PipelineAdaptor), so the search plugs
//! into a frame-in, predictions-out pipeline.
//!
//! # Example
//!
//! ```
//! use nnga::automl::{GeneticConfig, ParamGrid};
//!
//! let config = GeneticConfig::default().with_pop_size(8);
//! assert!(config.validate().is_ok());
//! assert_eq!(ParamGrid::default().len(), 4);
//! ```
//!
//! # References
//!
//! - Holland, J. H. (1975). Adaptation in Natural and Artificial Systems.
//! - Goldberg, D. E. (1989). Genetic Algorithms in Search, Optimization, and
//!   Machine Learning.

mod config;
mod genetic;
mod individual;
mod params;
mod population;
mod scoring;

pub use config::{Evaluation, GeneticConfig, SelectionStrategy};
pub use genetic::{
    breed, initialize_population, mutate, tournament_select, EvalData, GeneticSearch,
    SearchReport,
};
pub use individual::{reference_of, Genome, Individual};
pub use params::{
    HyperParam, ParamGrid, ParamValue, ACTIVATION, HIDDEN_LAYER_SIZES, OPTIMIZER, UNITS,
};
pub use population::{Population, SearchHistory};
pub use scoring::{
    regression_or_classification, scorer_for, Scorer, TaskMode, CLASSIFICATION, REGRESSION,
};
