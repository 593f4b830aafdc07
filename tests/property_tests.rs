//! Property-based tests using proptest.
//!
//! These tests verify invariants of genome identity, the genetic operators,
//! task mode detection and data splitting.

use nnga::automl::{
    breed, initialize_population, mutate, reference_of, regression_or_classification, Genome,
    HyperParam, ParamGrid, ParamValue, TaskMode,
};
use nnga::model_selection::{train_test_split, KFold};
use nnga::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn grid() -> ParamGrid {
    ParamGrid::default()
}

// Genomes drawn from the default grid
fn genome_strategy() -> impl Strategy<Value = Genome> {
    any::<u64>().prop_map(|seed| grid().sample(&mut StdRng::seed_from_u64(seed)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn reference_ignores_insertion_order(
        pairs in proptest::collection::btree_map("[a-z]{1,8}", 0i64..1000, 1..6)
    ) {
        let forward: Genome = pairs.iter().map(|(k, v)| (k.clone(), ParamValue::Int(*v))).collect();
        let mut backward = Genome::new();
        for (k, v) in pairs.iter().rev() {
            backward.insert(k.clone(), ParamValue::Int(*v));
        }
        prop_assert_eq!(reference_of(&forward), reference_of(&backward));
    }

    #[test]
    fn reference_separates_distinct_genomes(a in genome_strategy(), b in genome_strategy()) {
        prop_assert_eq!(a == b, reference_of(&a) == reference_of(&b));
    }

    #[test]
    fn children_only_carry_parental_alleles(
        mother in genome_strategy(),
        father in genome_strategy(),
        seed in any::<u64>(),
    ) {
        let grid = grid();
        let mut rng = StdRng::seed_from_u64(seed);
        for child in breed(&grid, &mother, &father, &mut rng) {
            prop_assert!(grid.contains(&child));
            for (name, allele) in &child {
                prop_assert!(mother.get(name) == Some(allele) || father.get(name) == Some(allele));
            }
        }
    }

    #[test]
    fn mutation_changes_at_most_one_gene(genome in genome_strategy(), seed in any::<u64>()) {
        let grid = grid();
        let mutated = mutate(&grid, &genome, &mut StdRng::seed_from_u64(seed));
        let changed = genome.iter().filter(|(k, v)| mutated.get(*k) != Some(*v)).count();
        prop_assert!(changed <= 1);
        prop_assert!(grid.contains(&mutated));
    }

    #[test]
    fn initial_population_is_distinct(size in 2usize..30, seed in any::<u64>()) {
        let grid = grid();
        let pop = initialize_population(&grid, size, 0, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(pop.len(), size);
        let mut refs: Vec<&str> = pop.iter().map(|i| i.reference()).collect();
        refs.dedup();
        prop_assert_eq!(refs.len(), size);
    }

    #[test]
    fn small_grid_caps_population(units in 1i64..5, size in 2usize..20) {
        let grid = ParamGrid::new().with_param("units", HyperParam::integer(1..=units));
        let pop = initialize_population(&grid, size, 0, &mut StdRng::seed_from_u64(0));
        prop_assert_eq!(pop.len(), size.min(units as usize));
    }

    #[test]
    fn binary_columns_are_classification(
        labels in proptest::collection::vec(prop::bool::ANY, 2..50)
    ) {
        let y = Vector::from_vec(labels.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect());
        let both = labels.iter().any(|&b| b) && labels.iter().any(|&b| !b);
        let expected = if both { TaskMode::Classification } else { TaskMode::Regression };
        prop_assert_eq!(regression_or_classification(&y), expected);
    }

    #[test]
    fn non_binary_columns_are_regression(
        values in proptest::collection::vec(-100.0f32..100.0, 1..50),
        extra in 2.0f32..100.0,
    ) {
        let mut values = values;
        values.push(extra);
        prop_assert_eq!(
            regression_or_classification(&Vector::from_vec(values)),
            TaskMode::Regression
        );
    }

    #[test]
    fn kfold_test_sets_partition_samples(n_samples in 4usize..60, n_splits in 2usize..5, seed in any::<u64>()) {
        let splits = KFold::new(n_splits).with_random_state(seed).split(n_samples).expect("enough samples");
        let mut seen: Vec<usize> = splits.iter().flat_map(|(_, test)| test.clone()).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n_samples).collect::<Vec<_>>());
        for (train, test) in &splits {
            prop_assert_eq!(train.len() + test.len(), n_samples);
        }
    }

    #[test]
    fn train_test_split_preserves_rows(n in 5usize..80, seed in any::<u64>()) {
        let x = Matrix::from_vec(n, 1, (0..n).map(|i| i as f32).collect()).expect("nx1");
        let y = Vector::from_vec((0..n).map(|i| i as f32).collect());
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.2, Some(seed)).expect("split");
        prop_assert_eq!(x_train.n_rows() + x_test.n_rows(), n);
        let mut rows: Vec<f32> = y_train.iter().chain(y_test.iter()).collect();
        rows.sort_by(f32::total_cmp);
        prop_assert_eq!(rows, (0..n).map(|i| i as f32).collect::<Vec<_>>());
        prop_assert_eq!(x_train.column(0), y_train);
    }
}
