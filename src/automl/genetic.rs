//! Genetic hyperparameter search over neural-network configurations.
//!
//! Each generation is evaluated, ranked and turned into the next one by
//! elitism, parent selection, mutation and uniform crossover. The
//! population size stays at `pop_size` and no genome appears twice in a
//! generation.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::config::{Evaluation, GeneticConfig, SelectionStrategy};
use super::individual::{Genome, Individual};
use super::params::{ParamGrid, ParamValue};
use super::population::{Population, SearchHistory};
use super::scoring::{regression_or_classification, scorer_for, Scorer, TaskMode};
use crate::data::DataFrame;
use crate::error::{NngaError, Result};
use crate::model_selection::{cross_validate, train_test_split, KFold};
use crate::nn::NeuralNetwork;
use crate::primitives::{Matrix, Vector};
use crate::traits::{Estimator, PipelineAdaptor};

/// Attempts allowed per missing individual before giving up on distinctness.
const ATTEMPTS_PER_SLOT: usize = 100;

/// Rows an individual is trained and scored on.
#[derive(Debug, Clone)]
pub enum EvalData {
    /// Fixed train/validation split.
    Holdout {
        /// Training features
        x_train: Matrix<f32>,
        /// Training targets
        y_train: Vector<f32>,
        /// Validation features
        x_val: Matrix<f32>,
        /// Validation targets
        y_val: Vector<f32>,
    },
    /// All rows, split into folds per individual.
    Folds {
        /// Features
        x: Matrix<f32>,
        /// Targets
        y: Vector<f32>,
        /// Number of folds
        n_splits: usize,
    },
}

impl EvalData {
    /// Seeded random split holding out `validation_fraction` of the rows.
    ///
    /// # Errors
    ///
    /// Propagates [`train_test_split`] errors.
    pub fn holdout(
        x: &Matrix<f32>,
        y: &Vector<f32>,
        validation_fraction: f32,
        seed: u64,
    ) -> Result<Self> {
        let (x_train, x_val, y_train, y_val) =
            train_test_split(x, y, validation_fraction, Some(seed))?;
        Ok(Self::Holdout {
            x_train,
            y_train,
            x_val,
            y_val,
        })
    }

    /// K-fold evaluation over all rows.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` if there are fewer rows than folds.
    pub fn folds(x: Matrix<f32>, y: Vector<f32>, n_splits: usize) -> Result<Self> {
        if n_splits < 2 || n_splits > x.n_rows() {
            return Err(NngaError::invalid_param(
                "n_splits",
                n_splits,
                format!("between 2 and the number of rows ({})", x.n_rows()),
            ));
        }
        Ok(Self::Folds { x, y, n_splits })
    }
}

/// Summary of a finished search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Task mode the search ran in
    pub mode: TaskMode,
    /// Metric used for fitness
    pub scorer: Scorer,
    /// Reference of the best individual
    pub best_reference: String,
    /// Genome of the best individual
    pub best_params: Genome,
    /// Fitness of the best individual
    pub best_score: Option<f64>,
    /// Generation the best individual was scored in
    pub best_generation: usize,
    /// Best fitness of each generation
    pub generation_best_scores: Vec<Option<f64>>,
    /// Feature columns used
    pub features: Vec<String>,
}

#[derive(Debug, Clone)]
struct Fitted {
    best: Individual,
    pipeline: NeuralNetwork,
    features: Vec<String>,
    ml_data: DataFrame,
}

/// Evolutionary search for the best network configuration.
///
/// # Example
///
/// ```
/// use nnga::prelude::*;
/// use nnga::automl::{GeneticConfig, GeneticSearch, HyperParam, ParamGrid};
///
/// let x: Vec<f32> = (0..40).map(|i| i as f32 / 10.0).collect();
/// let y: Vec<f32> = x.iter().map(|v| 2.0 * v + 1.0).collect();
/// let df = DataFrame::new(vec![
///     ("x".to_string(), Vector::from_vec(x)),
///     ("y".to_string(), Vector::from_vec(y)),
/// ]).unwrap();
///
/// let grid = ParamGrid::new()
///     .with_param("activation", HyperParam::categorical(["tanh", "relu"]))
///     .with_param("optimizer", HyperParam::categorical(["adam"]))
///     .with_param("units", HyperParam::integer(2..=6))
///     .with_param("hidden_layer_sizes", HyperParam::integer(1..=1));
/// let config = GeneticConfig::default()
///     .with_param_grid(grid)
///     .with_pop_size(4)
///     .with_n_generations(2)
///     .with_epochs(20);
///
/// let mut search = GeneticSearch::new(config).unwrap();
/// search.fit(&df, "y").unwrap();
/// let predictions = search.predict(&df, "y").unwrap();
/// assert_eq!(predictions.len(), 40);
/// assert_eq!(search.backend().unwrap().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct GeneticSearch {
    config: GeneticConfig,
    mode: Option<TaskMode>,
    population: Population,
    history: SearchHistory,
    rng: StdRng,
    fitted: Option<Fitted>,
}

impl GeneticSearch {
    /// Creates a search and samples generation 0.
    ///
    /// # Errors
    ///
    /// Returns the first configuration validation error.
    pub fn new(config: GeneticConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let population =
            initialize_population(&config.param_grid, config.pop_size, 0, &mut rng);
        Ok(Self {
            mode: config.mode,
            config,
            population,
            history: SearchHistory::new(),
            rng,
            fitted: None,
        })
    }

    /// Search settings.
    #[must_use]
    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Task mode; `None` until `fit` infers it or one is set.
    #[must_use]
    pub fn mode(&self) -> Option<TaskMode> {
        self.mode
    }

    /// Sets or clears the task mode used by [`Self::evaluate`].
    pub fn set_mode(&mut self, mode: Option<TaskMode>) {
        self.mode = mode;
    }

    /// The current (not yet archived) generation.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Scorer for the current mode.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` if no mode has been determined.
    pub fn scorer(&self) -> Result<Scorer> {
        scorer_for(self.mode, &self.config.reg_metric, &self.config.clf_metric)
    }

    /// Scores every unscored individual of the current generation.
    ///
    /// Models that fail to train score NaN. A NaN drops the individual from
    /// ranking in classification mode and ranks it last in regression mode.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMode` if the mode is neither regression nor
    /// classification.
    pub fn evaluate(&mut self, data: &EvalData) -> Result<()> {
        let scorer = self.scorer()?;
        let mode = scorer.mode();
        let pending: Vec<Individual> = self
            .population
            .iter()
            .filter(|i| i.score().is_none())
            .cloned()
            .collect();
        let generation = self.population.generation();

        let config = &self.config;
        let score_one = |ind: &Individual| {
            let started = Instant::now();
            let score = match score_individual(config, ind, mode, scorer, data) {
                Ok(s) => s,
                Err(e) => {
                    warn!(reference = ind.reference(), error = %e, "model failed to train");
                    f64::NAN
                }
            };
            debug!(
                generation,
                reference = ind.reference(),
                params = ?ind.params(),
                score,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "evaluated individual"
            );
            (ind.reference().to_string(), score)
        };

        #[cfg(feature = "parallel")]
        let scores: Vec<(String, f64)> = pending.par_iter().map(score_one).collect();
        #[cfg(not(feature = "parallel"))]
        let scores: Vec<(String, f64)> = pending.iter().map(score_one).collect();

        for (reference, score) in scores {
            let Some(ind) = self.population.get_mut(&reference) else {
                continue;
            };
            if score.is_nan() {
                match mode {
                    TaskMode::Classification => {
                        warn!(reference = %reference, "dropping individual with NaN score");
                        ind.set_score(None);
                    }
                    TaskMode::Regression => ind.set_score(Some(f64::NEG_INFINITY)),
                }
            } else {
                ind.set_score(Some(score));
            }
        }
        Ok(())
    }

    /// Archives the current (evaluated) generation and replaces it with the
    /// next one.
    pub fn evolve(&mut self) {
        let next_gen = self.population.generation() + 1;
        let pop_size = self.config.pop_size;
        let grid = &self.config.param_grid;
        let ranked: Vec<Individual> = self.population.ranked().into_iter().cloned().collect();
        let mut next = Population::new(next_gen);

        if ranked.is_empty() {
            warn!(generation = next_gen - 1, "no individual was scored; restarting from random");
        }

        let n_elite = elite_count(self.config.elitism_rate, pop_size, ranked.len());
        for elite in &ranked[..n_elite] {
            next.insert(elite.carried_into(next_gen));
        }

        let mut parents = match self.config.selection {
            SelectionStrategy::RankRetain => rank_retain(
                &ranked,
                self.config.selection_rate,
                self.config.random_rate,
                &mut self.rng,
            ),
            SelectionStrategy::Tournament { size } => {
                let n_parents = retain_count(self.config.selection_rate, ranked.len());
                tournament_parents(&ranked, n_parents, size, &mut self.rng)
            }
        };

        // Parents are bred as carried; elites are already in `next`.
        for parent in &mut parents {
            if next.contains(parent.reference()) {
                continue;
            }
            if self.rng.gen::<f64>() < self.config.mutation_rate {
                let mutated = mutate(grid, parent.params(), &mut self.rng);
                parent.set_params(mutated);
            }
        }

        for parent in &parents {
            if next.len() >= pop_size {
                break;
            }
            next.insert(parent.carried_into(next_gen));
        }

        let mut attempts = 0;
        let max_attempts = pop_size * ATTEMPTS_PER_SLOT;
        while parents.len() >= 2 && next.len() < pop_size && attempts < max_attempts {
            attempts += 1;
            let mother = &parents[self.rng.gen_range(0..parents.len())];
            let father = &parents[self.rng.gen_range(0..parents.len())];
            if mother.reference() == father.reference() {
                continue;
            }
            for genome in breed(grid, mother.params(), father.params(), &mut self.rng) {
                if next.len() >= pop_size {
                    break;
                }
                let child = Individual::new(genome, next_gen)
                    .with_parents(mother.reference(), father.reference());
                let child_ref = child.reference().to_string();
                if next.insert(child) {
                    for parent_ref in [mother.reference(), father.reference()] {
                        if let Some(p) = next.get_mut(parent_ref) {
                            p.add_child(&child_ref);
                        }
                        if let Some(p) = self.population.get_mut(parent_ref) {
                            p.add_child(&child_ref);
                        }
                    }
                }
            }
        }

        fill_random(&mut next, grid, pop_size, &mut self.rng);

        let finished = std::mem::replace(&mut self.population, next);
        self.history.push(finished);
    }

    fn log_generation(&self) {
        let generation = self.population.generation();
        let scored = self.population.ranked().len();
        let best = self.population.best().and_then(Individual::score);
        if self.config.pbar {
            info!(generation, scored, best_score = ?best, "generation evaluated");
        } else {
            debug!(generation, scored, best_score = ?best, "generation evaluated");
        }
    }

    fn fitted(&self) -> Result<&Fitted> {
        self.fitted
            .as_ref()
            .ok_or_else(|| NngaError::not_fitted("GeneticSearch"))
    }

    /// Network built from the best individual and refit on all rows.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`.
    pub fn best_pipeline(&self) -> Result<&NeuralNetwork> {
        Ok(&self.fitted()?.pipeline)
    }

    /// Best individual over all generations.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`.
    pub fn best_individual(&self) -> Result<&Individual> {
        Ok(&self.fitted()?.best)
    }

    /// Feature column names seen in `fit`, in order.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`.
    pub fn features(&self) -> Result<&[String]> {
        Ok(&self.fitted()?.features)
    }

    /// The frame the search was fitted on.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`.
    pub fn ml_data(&self) -> Result<&DataFrame> {
        Ok(&self.fitted()?.ml_data)
    }

    /// Archive of every evaluated generation.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`.
    pub fn backend(&self) -> Result<&SearchHistory> {
        self.fitted()?;
        Ok(&self.history)
    }

    /// Summary of the finished search.
    ///
    /// # Errors
    ///
    /// Returns `NotFitted` before `fit`.
    pub fn report(&self) -> Result<SearchReport> {
        let fitted = self.fitted()?;
        Ok(SearchReport {
            mode: fitted.pipeline.mode(),
            scorer: self.scorer()?,
            best_reference: fitted.best.reference().to_string(),
            best_params: fitted.best.params().clone(),
            best_score: fitted.best.score(),
            best_generation: fitted.best.generation(),
            generation_best_scores: self.history.best_scores(),
            features: fitted.features.clone(),
        })
    }
}

impl PipelineAdaptor for GeneticSearch {
    fn fit(&mut self, df: &DataFrame, target: &str) -> Result<()> {
        let started = Instant::now();
        info!(column = target, rows = df.n_rows(), columns = df.n_cols(), "fitting genetic search");

        let (x, y, features) = df.split_target(target)?;
        let mode = self
            .config
            .mode
            .unwrap_or_else(|| regression_or_classification(&y));
        self.mode = Some(mode);
        let scorer = self.scorer()?;
        info!(%mode, %scorer, "task mode determined");

        let data = match self.config.evaluation {
            Evaluation::Holdout => {
                EvalData::holdout(&x, &y, self.config.validation_fraction, self.config.seed)?
            }
            Evaluation::CrossValidation { n_splits } => {
                EvalData::folds(x.clone(), y.clone(), n_splits)?
            }
        };

        self.fitted = None;
        self.history = SearchHistory::new();
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.population = initialize_population(
            &self.config.param_grid,
            self.config.pop_size,
            0,
            &mut self.rng,
        );

        for _ in 0..self.config.n_generations {
            self.evaluate(&data)?;
            self.log_generation();
            self.evolve();
        }
        self.evaluate(&data)?;
        self.log_generation();
        let last = std::mem::take(&mut self.population);
        self.history.push(last);

        let best = self
            .history
            .best()
            .cloned()
            .ok_or_else(|| NngaError::Training("no individual produced a usable score".into()))?;
        let mut pipeline = configure_network(&self.config, &best, mode)?;
        pipeline.fit(&x, &y)?;

        info!(
            reference = best.reference(),
            params = ?best.params(),
            score = ?best.score(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "genetic search fitted"
        );
        self.fitted = Some(Fitted {
            best,
            pipeline,
            features,
            ml_data: df.clone(),
        });
        Ok(())
    }

    fn predict(&self, df: &DataFrame, target: &str) -> Result<Vector<f32>> {
        let started = Instant::now();
        let fitted = self.fitted()?;
        let frame = if df.has_column(target) {
            df.drop(target)?
        } else {
            df.clone()
        };
        let names = frame.column_names();
        if names != fitted.features {
            return Err(NngaError::DimensionMismatch {
                expected: format!("feature columns {:?}", fitted.features),
                actual: format!("{names:?}"),
            });
        }
        let predictions = fitted.pipeline.predict(&frame.to_matrix()?)?;
        info!(
            rows = predictions.len(),
            elapsed_s = started.elapsed().as_secs_f64(),
            "genetic search predicted"
        );
        Ok(predictions)
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

/// Per-model seed derived from the search seed and the genome identity,
/// independent of evaluation order.
fn model_seed(search_seed: u64, reference: &str) -> u64 {
    let digest = Sha256::new()
        .chain_update(search_seed.to_le_bytes())
        .chain_update(reference.as_bytes())
        .finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn configure_network(
    config: &GeneticConfig,
    individual: &Individual,
    mode: TaskMode,
) -> Result<NeuralNetwork> {
    let mut nn = individual
        .network(mode)?
        .with_epochs(config.epochs)
        .with_batch_size(config.batch_size)
        .with_seed(model_seed(config.seed, individual.reference()));
    if let Some(lr) = config.learning_rate {
        nn = nn.with_learning_rate(lr);
    }
    Ok(nn)
}

fn score_individual(
    config: &GeneticConfig,
    individual: &Individual,
    mode: TaskMode,
    scorer: Scorer,
    data: &EvalData,
) -> Result<f64> {
    let mut nn = configure_network(config, individual, mode)?;
    match data {
        EvalData::Holdout {
            x_train,
            y_train,
            x_val,
            y_val,
        } => {
            nn.fit(x_train, y_train)?;
            scorer.score(&nn, x_val, y_val)
        }
        EvalData::Folds { x, y, n_splits } => {
            let cv = KFold::new(*n_splits).with_random_state(config.seed);
            let result = cross_validate(&nn, x, y, &cv, |model, x, y| {
                scorer.score(model, x, y).map(|s| s as f32)
            })?;
            Ok(f64::from(result.mean()))
        }
    }
}

/// Samples up to `size` distinct individuals for `generation`.
///
/// Gives up after `size * 100` draws, so a grid with fewer than `size`
/// genomes yields a smaller population.
pub fn initialize_population(
    grid: &ParamGrid,
    size: usize,
    generation: usize,
    rng: &mut impl Rng,
) -> Population {
    let mut population = Population::new(generation);
    fill_random(&mut population, grid, size, rng);
    population
}

fn fill_random(population: &mut Population, grid: &ParamGrid, size: usize, rng: &mut impl Rng) {
    let generation = population.generation();
    let max_attempts = size * ATTEMPTS_PER_SLOT;
    let mut attempts = 0;
    while population.len() < size && attempts < max_attempts {
        attempts += 1;
        population.insert(Individual::new(grid.sample(rng), generation));
    }
    if population.len() < size {
        warn!(
            wanted = size,
            got = population.len(),
            grid_size = grid.cardinality(),
            "grid cannot supply enough distinct individuals"
        );
    }
}

/// Two children; each gene of each child is the mother's or the father's
/// allele with equal probability.
pub fn breed(grid: &ParamGrid, mother: &Genome, father: &Genome, rng: &mut impl Rng) -> [Genome; 2] {
    let mut child = || -> Genome {
        grid.names()
            .filter_map(|name| {
                let (first, second) = if rng.gen::<bool>() {
                    (mother, father)
                } else {
                    (father, mother)
                };
                first
                    .get(name)
                    .or_else(|| second.get(name))
                    .map(|v| (name.to_string(), v.clone()))
            })
            .collect()
    };
    [child(), child()]
}

/// Copy of `genome` with one uniformly chosen gene replaced by a uniformly
/// chosen allele.
pub fn mutate(grid: &ParamGrid, genome: &Genome, rng: &mut impl Rng) -> Genome {
    let mut mutated = genome.clone();
    if grid.is_empty() {
        return mutated;
    }
    let idx = rng.gen_range(0..grid.len());
    if let Some((name, param)) = grid.iter().nth(idx) {
        let allele: ParamValue = param.sample(rng);
        mutated.insert(name.to_string(), allele);
    }
    mutated
}

/// Best of `size` entrants drawn with replacement from `candidates`.
pub fn tournament_select<'a>(
    candidates: &'a [Individual],
    size: usize,
    rng: &mut impl Rng,
) -> Option<&'a Individual> {
    if candidates.is_empty() {
        return None;
    }
    let mut best = &candidates[rng.gen_range(0..candidates.len())];
    for _ in 1..size.max(1) {
        let entrant = &candidates[rng.gen_range(0..candidates.len())];
        if entrant.score().unwrap_or(f64::NEG_INFINITY) > best.score().unwrap_or(f64::NEG_INFINITY)
        {
            best = entrant;
        }
    }
    Some(best)
}

/// Retained parent count: `selection_rate` of the ranked individuals, at
/// least two when that many exist.
fn retain_count(selection_rate: f64, n_ranked: usize) -> usize {
    let retained = (n_ranked as f64 * selection_rate).floor() as usize;
    retained.max(2).min(n_ranked)
}

fn elite_count(elitism_rate: f64, pop_size: usize, n_ranked: usize) -> usize {
    if elitism_rate <= 0.0 {
        return 0;
    }
    let elites = (pop_size as f64 * elitism_rate).round() as usize;
    elites.max(1).min(n_ranked)
}

fn rank_retain(
    ranked: &[Individual],
    selection_rate: f64,
    random_rate: f64,
    rng: &mut impl Rng,
) -> Vec<Individual> {
    let retained = retain_count(selection_rate, ranked.len());
    let mut parents: Vec<Individual> = ranked[..retained].to_vec();
    for individual in &ranked[retained..] {
        if rng.gen::<f64>() < random_rate {
            parents.push(individual.clone());
        }
    }
    parents
}

fn tournament_parents(
    ranked: &[Individual],
    n_parents: usize,
    size: usize,
    rng: &mut impl Rng,
) -> Vec<Individual> {
    let mut parents: Vec<Individual> = Vec::with_capacity(n_parents);
    let mut attempts = 0;
    while parents.len() < n_parents && attempts < n_parents * ATTEMPTS_PER_SLOT {
        attempts += 1;
        if let Some(winner) = tournament_select(ranked, size, rng) {
            if parents.iter().all(|p| p.reference() != winner.reference()) {
                parents.push(winner.clone());
            }
        }
    }
    parents
}

#[cfg(test)]
#[path = "genetic_tests.rs"]
mod tests;
