//! One generation of individuals, and the archive of all generations.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::individual::Individual;

/// Individuals of one generation keyed by reference; a genome can appear
/// at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    generation: usize,
    members: BTreeMap<String, Individual>,
}

impl Population {
    /// Creates an empty population for `generation`.
    #[must_use]
    pub fn new(generation: usize) -> Self {
        Self {
            generation,
            members: BTreeMap::new(),
        }
    }

    /// Generation index.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Adds `individual`; returns false (and drops it) if its genome is
    /// already present.
    pub fn insert(&mut self, individual: Individual) -> bool {
        if self.members.contains_key(individual.reference()) {
            return false;
        }
        self.members
            .insert(individual.reference().to_string(), individual);
        true
    }

    /// Whether a genome with `reference` is present.
    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.members.contains_key(reference)
    }

    /// Looks up a member.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&Individual> {
        self.members.get(reference)
    }

    pub(crate) fn get_mut(&mut self, reference: &str) -> Option<&mut Individual> {
        self.members.get_mut(reference)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the population has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over members in reference order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.members.values()
    }

    /// Scored members, best first. Unscored members are left out; ties
    /// keep reference order.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Individual> {
        let mut scored: Vec<&Individual> =
            self.members.values().filter(|i| i.score().is_some()).collect();
        scored.sort_by(|a, b| compare_scores(b.score(), a.score()));
        scored
    }

    /// Best scored member.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.ranked().into_iter().next()
    }
}

fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Every evaluated generation, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHistory {
    generations: Vec<Population>,
}

impl SearchHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Archives an evaluated generation.
    pub fn push(&mut self, population: Population) {
        self.generations.push(population);
    }

    /// All archived generations.
    #[must_use]
    pub fn generations(&self) -> &[Population] {
        &self.generations
    }

    /// Number of archived generations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    /// Check if nothing has been archived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Best individual across all generations; the earliest wins ties.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        let mut best: Option<&Individual> = None;
        for candidate in self.generations.iter().filter_map(Population::best) {
            if best.map_or(true, |b| {
                compare_scores(candidate.score(), b.score()) == Ordering::Greater
            }) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Best score of each generation (`None` when nothing was scored).
    #[must_use]
    pub fn best_scores(&self) -> Vec<Option<f64>> {
        self.generations
            .iter()
            .map(|p| p.best().and_then(Individual::score))
            .collect()
    }

    /// Latest archived record of `reference`, searching newest first.
    #[must_use]
    pub fn find(&self, reference: &str) -> Option<&Individual> {
        self.generations.iter().rev().find_map(|p| p.get(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automl::individual::Genome;
    use crate::automl::params::ParamValue;

    fn individual(units: i64, generation: usize, score: Option<f64>) -> Individual {
        let mut g = Genome::new();
        g.insert("units".to_string(), ParamValue::Int(units));
        let mut ind = Individual::new(g, generation);
        ind.set_score(score);
        ind
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut pop = Population::new(0);
        assert!(pop.insert(individual(1, 0, None)));
        assert!(!pop.insert(individual(1, 0, Some(3.0))));
        assert!(pop.insert(individual(2, 0, None)));
        assert_eq!(pop.len(), 2);
    }

    #[test]
    fn test_ranked_sorts_descending_and_skips_unscored() {
        let mut pop = Population::new(0);
        pop.insert(individual(1, 0, Some(-3.0)));
        pop.insert(individual(2, 0, Some(-1.0)));
        pop.insert(individual(3, 0, None));
        pop.insert(individual(4, 0, Some(f64::NEG_INFINITY)));
        let scores: Vec<f64> = pop.ranked().iter().filter_map(|i| i.score()).collect();
        assert_eq!(scores, vec![-1.0, -3.0, f64::NEG_INFINITY]);
        assert_eq!(pop.best().and_then(Individual::score), Some(-1.0));
    }

    #[test]
    fn test_history_best_across_generations() {
        let mut history = SearchHistory::new();
        let mut g0 = Population::new(0);
        g0.insert(individual(1, 0, Some(0.5)));
        let mut g1 = Population::new(1);
        g1.insert(individual(2, 1, Some(0.9)));
        g1.insert(individual(3, 1, Some(0.1)));
        let mut g2 = Population::new(2);
        g2.insert(individual(4, 2, Some(0.9)));
        history.push(g0);
        history.push(g1);
        history.push(g2);

        let best = history.best().expect("scored");
        assert_eq!(best.generation(), 1);
        assert_eq!(history.best_scores(), vec![Some(0.5), Some(0.9), Some(0.9)]);
    }

    #[test]
    fn test_history_find_prefers_newest() {
        let mut history = SearchHistory::new();
        let mut g0 = Population::new(0);
        g0.insert(individual(1, 0, Some(0.1)));
        let mut g1 = Population::new(1);
        g1.insert(individual(1, 0, Some(0.1)).carried_into(1));
        history.push(g0);
        history.push(g1);
        let reference = individual(1, 0, None).reference().to_string();
        assert_eq!(history.find(&reference).map(Individual::generation), Some(1));
        assert!(history.find("model_missing").is_none());
    }
}
