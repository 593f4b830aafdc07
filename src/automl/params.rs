//! Hyperparameter grid: the alleles every gene of an individual can take.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NngaError, Result};

/// Gene name for the hidden-layer activation.
pub const ACTIVATION: &str = "activation";
/// Gene name for the optimizer.
pub const OPTIMIZER: &str = "optimizer";
/// Gene name for units per hidden layer.
pub const UNITS: &str = "units";
/// Gene name for the number of hidden layers.
pub const HIDDEN_LAYER_SIZES: &str = "hidden_layer_sizes";

/// A concrete gene value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer gene (units, layer count)
    Int(i64),
    /// Named gene (activation, optimizer)
    Str(String),
}

impl ParamValue {
    /// Get as i64 if integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    /// Get as string if named.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Allowed values of one gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HyperParam {
    /// Integer gene in [low, high].
    Integer {
        /// Inclusive lower bound
        low: i64,
        /// Inclusive upper bound
        high: i64,
    },
    /// Gene with discrete choices.
    Categorical {
        /// Allowed values
        choices: Vec<ParamValue>,
    },
}

impl HyperParam {
    /// Create integer parameter from an inclusive range.
    #[must_use]
    pub fn integer(range: RangeInclusive<i64>) -> Self {
        Self::Integer {
            low: *range.start(),
            high: *range.end(),
        }
    }

    /// Create categorical parameter from choices.
    #[must_use]
    pub fn categorical<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::Categorical {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of distinct alleles (0 for an empty or inverted range).
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        match self {
            Self::Integer { low, high } => {
                if high < low {
                    0
                } else {
                    high.abs_diff(*low).saturating_add(1)
                }
            }
            Self::Categorical { choices } => choices.len() as u64,
        }
    }

    /// Whether `value` is an allowed allele.
    #[must_use]
    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::Integer { low, high }, ParamValue::Int(v)) => (*low..=*high).contains(v),
            (Self::Categorical { choices }, v) => choices.contains(v),
            _ => false,
        }
    }

    /// Sample an allele uniformly.
    ///
    /// # Panics
    ///
    /// Panics if the gene has no alleles; [`ParamGrid::validate`] rules
    /// that out for grids.
    pub fn sample(&self, rng: &mut impl Rng) -> ParamValue {
        match self {
            Self::Integer { low, high } => ParamValue::Int(rng.gen_range(*low..=*high)),
            Self::Categorical { choices } => choices[rng.gen_range(0..choices.len())].clone(),
        }
    }
}

/// Mapping from gene name to its allowed alleles.
///
/// Keys are ordered so sampling with a seeded RNG is reproducible.
///
/// # Example
///
/// ```
/// use nnga::automl::{HyperParam, ParamGrid};
///
/// let grid = ParamGrid::new()
///     .with_param("activation", HyperParam::categorical(["relu", "tanh"]))
///     .with_param("units", HyperParam::integer(1..=8));
/// assert_eq!(grid.cardinality(), 16);
/// assert!(grid.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid {
    params: BTreeMap<String, HyperParam>,
}

impl Default for ParamGrid {
    /// Activation, optimizer, hidden units (1..=999) and hidden layer
    /// count (1..=4).
    fn default() -> Self {
        Self::new()
            .with_param(
                ACTIVATION,
                HyperParam::categorical(["sigmoid", "tanh", "relu", "elu"]),
            )
            .with_param(
                OPTIMIZER,
                HyperParam::categorical([
                    "sgd", "rmsprop", "adagrad", "adadelta", "nadam", "adamax", "adam",
                ]),
            )
            .with_param(UNITS, HyperParam::integer(1..=999))
            .with_param(HIDDEN_LAYER_SIZES, HyperParam::integer(1..=4))
    }
}

impl ParamGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Adds or replaces a gene.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, param: HyperParam) -> Self {
        self.params.insert(name.into(), param);
        self
    }

    /// Alleles of gene `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HyperParam> {
        self.params.get(name)
    }

    /// Gene names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Iterate over `(name, alleles)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HyperParam)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of genes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the grid has no genes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of distinct individuals the grid can express (saturating).
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        if self.params.is_empty() {
            return 0;
        }
        self.params
            .values()
            .fold(1_u64, |acc, p| acc.saturating_mul(p.cardinality()))
    }

    /// Rejects an empty grid or a gene without alleles.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` naming the offending gene.
    pub fn validate(&self) -> Result<()> {
        if self.params.is_empty() {
            return Err(NngaError::invalid_param(
                "param_grid",
                "{}",
                "at least one gene",
            ));
        }
        for (name, param) in &self.params {
            if param.cardinality() == 0 {
                return Err(NngaError::invalid_param(
                    name.as_str(),
                    format!("{param:?}"),
                    "a non-empty set of alleles",
                ));
            }
        }
        Ok(())
    }

    /// Samples every gene independently and uniformly.
    pub fn sample(&self, rng: &mut impl Rng) -> BTreeMap<String, ParamValue> {
        self.params
            .iter()
            .map(|(name, param)| (name.clone(), param.sample(rng)))
            .collect()
    }

    /// Whether every gene of `genome` is named by the grid and allowed.
    #[must_use]
    pub fn contains(&self, genome: &BTreeMap<String, ParamValue>) -> bool {
        genome.len() == self.params.len()
            && genome
                .iter()
                .all(|(k, v)| self.params.get(k).is_some_and(|p| p.contains(v)))
    }
}
