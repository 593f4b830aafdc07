//! Search configuration, loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::params::ParamGrid;
use super::scoring::{Scorer, TaskMode};
use crate::error::{NngaError, Result};

/// How parents are chosen from a ranked generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Keep the top `selection_rate` fraction, then admit each remaining
    /// individual with probability `random_rate`.
    RankRetain,
    /// Repeated tournaments of `size` random entrants; best score wins.
    Tournament {
        /// Entrants per tournament
        size: usize,
    },
}

/// How an individual's fitness is measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Evaluation {
    /// Fit on the training split, score on the validation split.
    Holdout,
    /// Mean score of shuffled K-fold cross-validation over all rows.
    CrossValidation {
        /// Number of folds
        n_splits: usize,
    },
}

/// Genetic search settings.
///
/// Missing JSON fields take their defaults.
///
/// # Example
///
/// ```
/// use nnga::automl::{GeneticConfig, SelectionStrategy};
///
/// let config = GeneticConfig::default()
///     .with_pop_size(8)
///     .with_n_generations(3)
///     .with_selection(SelectionStrategy::Tournament { size: 3 });
/// assert!(config.validate().is_ok());
///
/// let parsed = GeneticConfig::from_json_str(r#"{"pop_size": 4, "clf_metric": "accuracy"}"#)
///     .expect("valid json");
/// assert_eq!(parsed.pop_size, 4);
/// assert_eq!(parsed.n_generations, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    /// Genes and their alleles
    pub param_grid: ParamGrid,
    /// Individuals per generation
    pub pop_size: usize,
    /// Number of evolve rounds after generation 0
    pub n_generations: usize,
    /// Fraction of ranked individuals retained as parents
    pub selection_rate: f64,
    /// Chance for a non-retained individual to become a parent
    pub random_rate: f64,
    /// Chance for a non-elite parent to have one gene mutated
    pub mutation_rate: f64,
    /// Fraction of best individuals copied unchanged
    pub elitism_rate: f64,
    /// Regression metric: `neg_mae` (alias `mae`) or `neg_mse`
    pub reg_metric: String,
    /// Classification metric: `f1`, `roc_auc` or `accuracy`
    pub clf_metric: String,
    /// Parent selection strategy
    pub selection: SelectionStrategy,
    /// Fitness evaluation method
    pub evaluation: Evaluation,
    /// Fraction of rows held out for validation
    pub validation_fraction: f32,
    /// Task mode override; inferred from the target when `None`
    pub mode: Option<TaskMode>,
    /// Training epochs per model
    pub epochs: usize,
    /// Mini-batch size per model
    pub batch_size: usize,
    /// Learning rate override; optimizer default when `None`
    pub learning_rate: Option<f32>,
    /// Seed for every random choice of the search
    pub seed: u64,
    /// Log per-generation progress at info level
    pub pbar: bool,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            param_grid: ParamGrid::default(),
            pop_size: 15,
            n_generations: 10,
            selection_rate: 0.75,
            random_rate: 0.05,
            mutation_rate: 0.05,
            elitism_rate: 0.05,
            reg_metric: "neg_mae".to_string(),
            clf_metric: "f1".to_string(),
            selection: SelectionStrategy::RankRetain,
            evaluation: Evaluation::Holdout,
            validation_fraction: 0.2,
            mode: None,
            epochs: 100,
            batch_size: 32,
            learning_rate: None,
            seed: 42,
            pbar: true,
        }
    }
}

impl GeneticConfig {
    /// Set the hyperparameter grid.
    #[must_use]
    pub fn with_param_grid(mut self, grid: ParamGrid) -> Self {
        self.param_grid = grid;
        self
    }

    /// Set population size.
    #[must_use]
    pub fn with_pop_size(mut self, pop_size: usize) -> Self {
        self.pop_size = pop_size;
        self
    }

    /// Set the number of generations.
    #[must_use]
    pub fn with_n_generations(mut self, n: usize) -> Self {
        self.n_generations = n;
        self
    }

    /// Set the retained fraction.
    #[must_use]
    pub fn with_selection_rate(mut self, rate: f64) -> Self {
        self.selection_rate = rate;
        self
    }

    /// Set the random-admission probability.
    #[must_use]
    pub fn with_random_rate(mut self, rate: f64) -> Self {
        self.random_rate = rate;
        self
    }

    /// Set the mutation probability.
    #[must_use]
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the elite fraction.
    #[must_use]
    pub fn with_elitism_rate(mut self, rate: f64) -> Self {
        self.elitism_rate = rate;
        self
    }

    /// Set the regression metric name.
    #[must_use]
    pub fn with_reg_metric(mut self, name: impl Into<String>) -> Self {
        self.reg_metric = name.into();
        self
    }

    /// Set the classification metric name.
    #[must_use]
    pub fn with_clf_metric(mut self, name: impl Into<String>) -> Self {
        self.clf_metric = name.into();
        self
    }

    /// Set the selection strategy.
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    /// Set the evaluation method.
    #[must_use]
    pub fn with_evaluation(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Set the validation fraction.
    #[must_use]
    pub fn with_validation_fraction(mut self, fraction: f32) -> Self {
        self.validation_fraction = fraction;
        self
    }

    /// Force a task mode instead of inferring it.
    #[must_use]
    pub fn with_mode(mut self, mode: TaskMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set training epochs per model.
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the mini-batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Override every optimizer's learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = Some(learning_rate);
        self
    }

    /// Set random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Toggle info-level progress logging.
    #[must_use]
    pub fn with_pbar(mut self, pbar: bool) -> Self {
        self.pbar = pbar;
        self
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        self.param_grid.validate()?;
        if self.pop_size < 2 {
            return Err(NngaError::invalid_param("pop_size", self.pop_size, ">= 2"));
        }
        for (name, rate) in [
            ("selection_rate", self.selection_rate),
            ("random_rate", self.random_rate),
            ("mutation_rate", self.mutation_rate),
            ("elitism_rate", self.elitism_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(NngaError::invalid_param(name, rate, "a rate in [0, 1]"));
            }
        }
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(NngaError::invalid_param(
                "validation_fraction",
                self.validation_fraction,
                "a fraction in (0, 1)",
            ));
        }
        if self.epochs == 0 {
            return Err(NngaError::invalid_param("epochs", self.epochs, ">= 1"));
        }
        if self.batch_size == 0 {
            return Err(NngaError::invalid_param("batch_size", self.batch_size, ">= 1"));
        }
        if let Some(lr) = self.learning_rate {
            if !(lr > 0.0 && lr.is_finite()) {
                return Err(NngaError::invalid_param("learning_rate", lr, "> 0"));
            }
        }
        if let SelectionStrategy::Tournament { size } = self.selection {
            if size == 0 {
                return Err(NngaError::invalid_param("tournament size", size, ">= 1"));
            }
        }
        if let Evaluation::CrossValidation { n_splits } = self.evaluation {
            if n_splits < 2 {
                return Err(NngaError::invalid_param("n_splits", n_splits, ">= 2"));
            }
        }
        Scorer::regression(&self.reg_metric)?;
        Scorer::classification(&self.clf_metric)?;
        Ok(())
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON or a validation error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`Self::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
