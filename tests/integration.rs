//! Integration tests for nnga.
//!
//! These tests verify end-to-end workflows: CSV in, search, predictions
//! and reports out.

use nnga::automl::{
    Evaluation, GeneticConfig, GeneticSearch, HyperParam, ParamGrid, Scorer, SearchReport,
    SelectionStrategy, TaskMode,
};
use nnga::prelude::*;
use std::io::Write;

fn small_grid() -> ParamGrid {
    ParamGrid::new()
        .with_param("activation", HyperParam::categorical(["tanh", "relu", "elu"]))
        .with_param("optimizer", HyperParam::categorical(["adam", "nadam"]))
        .with_param("units", HyperParam::integer(2..=10))
        .with_param("hidden_layer_sizes", HyperParam::integer(1..=2))
}

fn quick_config() -> GeneticConfig {
    GeneticConfig::default()
        .with_param_grid(small_grid())
        .with_pop_size(5)
        .with_n_generations(2)
        .with_epochs(25)
        .with_pbar(false)
}

fn regression_csv() -> String {
    let mut csv = String::from("a,b,price\n");
    for i in 0..48 {
        let a = (i % 8) as f32;
        let b = (i / 8) as f32;
        csv.push_str(&format!("{a},{b},{}\n", 1.5 * a - b + 4.0));
    }
    csv
}

fn classification_frame() -> DataFrame {
    let mut a = Vec::new();
    let mut b = Vec::new();
    let mut label = Vec::new();
    for i in -6..6 {
        for j in -3..3 {
            let (x0, x1) = (i as f32 + 0.5, j as f32 + 0.5);
            a.push(x0);
            b.push(x1);
            label.push(if x0 - x1 > 0.0 { 1.0 } else { 0.0 });
        }
    }
    DataFrame::new(vec![
        ("a".to_string(), Vector::from_vec(a)),
        ("b".to_string(), Vector::from_vec(b)),
        ("label".to_string(), Vector::from_vec(label)),
    ])
    .expect("valid frame")
}

#[test]
fn test_regression_search_from_csv_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(regression_csv().as_bytes()).expect("write csv");
    let df = DataFrame::read_csv(file.path()).expect("read csv");
    assert_eq!(df.shape(), (48, 3));

    let mut search = GeneticSearch::new(quick_config()).expect("valid config");
    search.fit(&df, "price").expect("search runs");

    assert_eq!(search.mode(), Some(TaskMode::Regression));
    assert_eq!(search.features().expect("fitted"), ["a", "b"]);
    let history = search.backend().expect("fitted");
    assert_eq!(history.len(), 3);
    assert!(history.generations().iter().all(|g| g.len() == 5));

    let predictions = search.predict(&df, "price").expect("predict");
    assert_eq!(predictions.len(), 48);
    assert!(predictions.is_finite());

    let y = df.column("price").expect("target");
    let best = search.best_individual().expect("fitted");
    // neg_mae on the validation split, so never above zero
    assert!(best.score().is_some_and(|s| s <= 0.0));
    assert!(mae(&predictions, y).is_finite());
}

#[test]
fn test_classification_search_with_roc_auc() {
    let df = classification_frame();
    let config = quick_config().with_clf_metric("roc_auc");
    let mut search = GeneticSearch::new(config).expect("valid config");
    search.fit(&df, "label").expect("search runs");

    assert_eq!(search.mode(), Some(TaskMode::Classification));
    assert_eq!(search.scorer().expect("mode set"), Scorer::RocAuc);
    let predictions = search.predict(&df, "label").expect("predict");
    assert!(predictions.iter().all(|p| p == 0.0 || p == 1.0));
    let best = search.best_individual().expect("fitted");
    assert!(best.score().is_some_and(|s| (0.0..=1.0).contains(&s)));
}

#[test]
fn test_mode_override_treats_binary_target_as_regression() {
    let df = classification_frame();
    let config = quick_config()
        .with_mode(TaskMode::Regression)
        .with_n_generations(1);
    let mut search = GeneticSearch::new(config).expect("valid config");
    search.fit(&df, "label").expect("search runs");
    assert_eq!(search.mode(), Some(TaskMode::Regression));
    assert_eq!(
        search.best_pipeline().expect("fitted").mode(),
        TaskMode::Regression
    );
}

#[test]
fn test_tournament_and_cross_validation_search() {
    let df = DataFrame::from_csv_str(&regression_csv()).expect("parse csv");
    let config = quick_config()
        .with_selection(SelectionStrategy::Tournament { size: 2 })
        .with_evaluation(Evaluation::CrossValidation { n_splits: 3 });
    let mut search = GeneticSearch::new(config).expect("valid config");
    search.fit(&df, "price").expect("search runs");
    let history = search.backend().expect("fitted");
    assert!(history.generations().iter().all(|g| g.len() == 5));
}

#[test]
fn test_config_file_round_trip_drives_search() {
    let config = quick_config().with_seed(7).with_reg_metric("neg_mse");
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("search.json");
    std::fs::write(&path, config.to_json().expect("serialize")).expect("write config");

    let loaded = GeneticConfig::from_json_file(&path).expect("load config");
    assert_eq!(loaded, config);

    let df = DataFrame::from_csv_str(&regression_csv()).expect("parse csv");
    let mut search = GeneticSearch::new(loaded).expect("valid config");
    search.fit(&df, "price").expect("search runs");

    let report = search.report().expect("fitted");
    assert_eq!(report.scorer, Scorer::NegMse);
    let json = serde_json::to_string(&report).expect("serialize report");
    let parsed: SearchReport = serde_json::from_str(&json).expect("parse report");
    assert_eq!(parsed.best_reference, report.best_reference);
    assert_eq!(parsed.generation_best_scores.len(), 3);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"pop_size": 1}"#).expect("write config");
    assert!(matches!(
        GeneticConfig::from_json_file(&path),
        Err(NngaError::InvalidHyperparameter { .. })
    ));
    assert!(matches!(
        GeneticConfig::from_json_file(dir.path().join("missing.json")),
        Err(NngaError::Io(_))
    ));
}

#[test]
fn test_predict_before_fit_and_missing_target() {
    let df = DataFrame::from_csv_str(&regression_csv()).expect("parse csv");
    let mut search = GeneticSearch::new(quick_config()).expect("valid config");
    assert!(matches!(
        search.predict(&df, "price"),
        Err(NngaError::NotFitted { .. })
    ));
    assert!(matches!(
        search.fit(&df, "volume"),
        Err(NngaError::ColumnNotFound(_))
    ));
}
