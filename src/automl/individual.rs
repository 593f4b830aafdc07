//! A candidate hyperparameter configuration and its lineage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::params::{ParamValue, ACTIVATION, HIDDEN_LAYER_SIZES, OPTIMIZER, UNITS};
use super::scoring::TaskMode;
use crate::error::{NngaError, Result};
use crate::nn::{Activation, NeuralNetwork};
use crate::optim::OptimizerKind;

/// Gene name to allele; ordered so identity does not depend on insertion
/// order.
pub type Genome = BTreeMap<String, ParamValue>;

/// Identity of a genome: `"model_"` followed by the hex SHA-256 of its
/// key-sorted `name=value` pairs.
///
/// # Example
///
/// ```
/// use nnga::automl::{reference_of, Genome, ParamValue};
///
/// let mut a = Genome::new();
/// a.insert("units".into(), ParamValue::Int(8));
/// a.insert("activation".into(), ParamValue::from("relu"));
///
/// let mut b = Genome::new();
/// b.insert("activation".into(), ParamValue::from("relu"));
/// b.insert("units".into(), ParamValue::Int(8));
///
/// assert_eq!(reference_of(&a), reference_of(&b));
/// assert!(reference_of(&a).starts_with("model_"));
/// ```
#[must_use]
pub fn reference_of(genome: &Genome) -> String {
    let mut hasher = Sha256::new();
    for (name, value) in genome {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        // Tag the variant so Int(1) and Str("1") differ.
        match value {
            ParamValue::Int(v) => hasher.update(format!("i:{v}").as_bytes()),
            ParamValue::Str(v) => hasher.update(format!("s:{v}").as_bytes()),
        }
        hasher.update(b";");
    }
    let digest = hasher.finalize();
    let mut reference = String::with_capacity(6 + digest.len() * 2);
    reference.push_str("model_");
    for byte in digest {
        reference.push_str(&format!("{byte:02x}"));
    }
    reference
}

/// One candidate: genome, generation, fitness and lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    params: Genome,
    reference: String,
    generation: usize,
    score: Option<f64>,
    parents: Option<(String, String)>,
    children: Vec<String>,
}

impl Individual {
    /// Creates an unscored individual born in `generation`.
    #[must_use]
    pub fn new(params: Genome, generation: usize) -> Self {
        let reference = reference_of(&params);
        Self {
            params,
            reference,
            generation,
            score: None,
            parents: None,
            children: Vec::new(),
        }
    }

    /// Records the two parents this individual was bred from.
    #[must_use]
    pub fn with_parents(mut self, mother: &str, father: &str) -> Self {
        self.parents = Some((mother.to_string(), father.to_string()));
        self
    }

    /// The genome.
    #[must_use]
    pub fn params(&self) -> &Genome {
        &self.params
    }

    /// Content hash of the genome.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Generation this individual was created for.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fitness, once evaluated.
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Parent references, if bred.
    #[must_use]
    pub fn parents(&self) -> Option<(&str, &str)> {
        self.parents
            .as_ref()
            .map(|(m, f)| (m.as_str(), f.as_str()))
    }

    /// References of children bred from this individual.
    #[must_use]
    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub(crate) fn set_score(&mut self, score: Option<f64>) {
        self.score = score;
    }

    pub(crate) fn add_child(&mut self, reference: &str) {
        if !self.children.iter().any(|c| c == reference) {
            self.children.push(reference.to_string());
        }
    }

    /// Copy of this individual carried into `generation`: same genome and
    /// score, lineage kept.
    #[must_use]
    pub(crate) fn carried_into(&self, generation: usize) -> Self {
        let mut copy = self.clone();
        copy.generation = generation;
        copy
    }

    /// Replaces the genome, recomputing the reference and clearing the
    /// score and children.
    pub(crate) fn set_params(&mut self, params: Genome) {
        self.reference = reference_of(&params);
        self.params = params;
        self.score = None;
        self.children.clear();
    }

    /// Builds an unfitted network from this genome.
    ///
    /// Genes the grid does not define keep the network's defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for a gene of the wrong type or an
    /// unknown activation/optimizer name.
    pub fn network(&self, mode: TaskMode) -> Result<NeuralNetwork> {
        let mut nn = NeuralNetwork::new(mode);
        if let Some(v) = self.params.get(ACTIVATION) {
            nn = nn.with_activation(Activation::parse(expect_str(ACTIVATION, v)?)?);
        }
        if let Some(v) = self.params.get(OPTIMIZER) {
            nn = nn.with_optimizer(OptimizerKind::parse(expect_str(OPTIMIZER, v)?)?);
        }
        if let Some(v) = self.params.get(UNITS) {
            nn = nn.with_units(expect_count(UNITS, v)?);
        }
        if let Some(v) = self.params.get(HIDDEN_LAYER_SIZES) {
            nn = nn.with_hidden_layers(expect_count(HIDDEN_LAYER_SIZES, v)?);
        }
        Ok(nn)
    }
}

fn expect_str<'a>(name: &str, value: &'a ParamValue) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| NngaError::invalid_param(name, value, "a name"))
}

fn expect_count(name: &str, value: &ParamValue) -> Result<usize> {
    value
        .as_i64()
        .filter(|v| *v >= 1)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| NngaError::invalid_param(name, value, "an integer >= 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(activation: &str, optimizer: &str, units: i64, layers: i64) -> Genome {
        let mut g = Genome::new();
        g.insert(ACTIVATION.to_string(), ParamValue::from(activation));
        g.insert(OPTIMIZER.to_string(), ParamValue::from(optimizer));
        g.insert(UNITS.to_string(), ParamValue::Int(units));
        g.insert(HIDDEN_LAYER_SIZES.to_string(), ParamValue::Int(layers));
        g
    }

    #[test]
    fn test_reference_is_deterministic() {
        let a = Individual::new(genome("relu", "adam", 10, 2), 0);
        let b = Individual::new(genome("relu", "adam", 10, 2), 5);
        assert_eq!(a.reference(), b.reference());
        assert_eq!(a.reference().len(), "model_".len() + 64);
    }

    #[test]
    fn test_reference_differs_for_different_genomes() {
        let a = reference_of(&genome("relu", "adam", 10, 2));
        let b = reference_of(&genome("relu", "adam", 11, 2));
        let c = reference_of(&genome("tanh", "adam", 10, 2));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reference_distinguishes_value_types() {
        let mut a = Genome::new();
        a.insert("x".into(), ParamValue::Int(1));
        let mut b = Genome::new();
        b.insert("x".into(), ParamValue::from("1"));
        assert_ne!(reference_of(&a), reference_of(&b));
    }

    #[test]
    fn test_network_from_genome() {
        let ind = Individual::new(genome("elu", "nadam", 7, 3), 0);
        let nn = ind.network(TaskMode::Classification).expect("valid genome");
        assert_eq!(nn.activation(), Activation::Elu);
        assert_eq!(nn.optimizer(), OptimizerKind::Nadam);
        assert_eq!(nn.units(), 7);
        assert_eq!(nn.hidden_layers(), 3);
        assert_eq!(nn.mode(), TaskMode::Classification);
    }

    #[test]
    fn test_network_rejects_bad_genes() {
        let bad_units = Individual::new(genome("relu", "adam", 0, 1), 0);
        assert!(bad_units.network(TaskMode::Regression).is_err());
        let bad_act = Individual::new(genome("swish", "adam", 4, 1), 0);
        assert!(bad_act.network(TaskMode::Regression).is_err());
        let mut typed = genome("relu", "adam", 4, 1);
        typed.insert(UNITS.to_string(), ParamValue::from("four"));
        assert!(Individual::new(typed, 0).network(TaskMode::Regression).is_err());
    }

    #[test]
    fn test_lineage_bookkeeping() {
        let mut parent = Individual::new(genome("relu", "adam", 4, 1), 0);
        let child = Individual::new(genome("tanh", "adam", 4, 1), 1).with_parents("m", "f");
        assert_eq!(child.parents(), Some(("m", "f")));
        parent.add_child(child.reference());
        parent.add_child(child.reference());
        assert_eq!(parent.children().len(), 1);
    }

    #[test]
    fn test_set_params_resets_score() {
        let mut ind = Individual::new(genome("relu", "adam", 4, 1), 0);
        let old = ind.reference().to_string();
        ind.set_score(Some(1.0));
        ind.add_child("model_child");
        ind.set_params(genome("relu", "sgd", 4, 1));
        assert_ne!(ind.reference(), old);
        assert_eq!(ind.score(), None);
        assert!(ind.children().is_empty());
    }
}
