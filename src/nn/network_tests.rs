use super::*;

fn linear_regression_data() -> (Matrix<f32>, Vector<f32>) {
    // y = 3*x0 - 2*x1 + 5 on a 6x6 grid
    let mut rows = Vec::new();
    let mut y = Vec::new();
    for i in 0..6 {
        for j in 0..6 {
            let (a, b) = (i as f32, j as f32);
            rows.extend([a, b]);
            y.push(3.0 * a - 2.0 * b + 5.0);
        }
    }
    (
        Matrix::from_vec(36, 2, rows).expect("36x2"),
        Vector::from_vec(y),
    )
}

fn separable_classification_data() -> (Matrix<f32>, Vector<f32>) {
    // Class 1 iff x0 + x1 > 0
    let mut rows = Vec::new();
    let mut y = Vec::new();
    for i in -5..5 {
        for j in -5..5 {
            let (a, b) = (i as f32 + 0.5, j as f32 + 0.25);
            rows.extend([a, b]);
            y.push(if a + b > 0.0 { 1.0 } else { 0.0 });
        }
    }
    (
        Matrix::from_vec(100, 2, rows).expect("100x2"),
        Vector::from_vec(y),
    )
}

#[test]
fn test_predict_before_fit_is_not_fitted() {
    let nn = NeuralNetwork::new(TaskMode::Regression);
    assert!(!nn.is_fitted());
    let err = nn.predict(&Matrix::zeros(1, 2)).unwrap_err();
    assert!(matches!(err, NngaError::NotFitted { .. }));
}

#[test]
fn test_fit_empty_matrix() {
    let mut nn = NeuralNetwork::new(TaskMode::Regression);
    let err = nn
        .fit(&Matrix::zeros(0, 2), &Vector::from_vec(vec![]))
        .unwrap_err();
    assert!(matches!(err, NngaError::EmptyData(_)));
}

#[test]
fn test_fit_mismatched_targets() {
    let mut nn = NeuralNetwork::new(TaskMode::Regression);
    let err = nn
        .fit(&Matrix::zeros(3, 2), &Vector::from_slice(&[1.0, 2.0]))
        .unwrap_err();
    assert!(matches!(err, NngaError::DimensionMismatch { .. }));
}

#[test]
fn test_zero_units_rejected() {
    let (x, y) = linear_regression_data();
    let mut nn = NeuralNetwork::new(TaskMode::Regression).with_units(0);
    assert!(matches!(
        nn.fit(&x, &y),
        Err(NngaError::InvalidHyperparameter { .. })
    ));
}

#[test]
fn test_classification_rejects_non_binary_labels() {
    let x = Matrix::zeros(3, 1);
    let y = Vector::from_slice(&[0.0, 1.0, 2.0]);
    let mut nn = NeuralNetwork::new(TaskMode::Classification);
    let err = nn.fit(&x, &y).unwrap_err();
    assert!(err.to_string().contains("0 or 1"));
}

#[test]
fn test_parameter_count() {
    let x = Matrix::zeros(4, 3);
    let y = Vector::from_slice(&[0.0, 1.0, 2.0, 3.0]);
    let mut nn = NeuralNetwork::new(TaskMode::Regression)
        .with_units(4)
        .with_hidden_layers(2)
        .with_epochs(1);
    nn.fit(&x, &y).expect("fit");
    // (3*4 + 4) + (4*4 + 4) + (4*1 + 1)
    assert_eq!(nn.n_parameters(), Some(41));
}

#[test]
fn test_regression_learns_linear_function() {
    let (x, y) = linear_regression_data();
    let mut nn = NeuralNetwork::new(TaskMode::Regression)
        .with_activation(Activation::Tanh)
        .with_optimizer(OptimizerKind::Adam)
        .with_units(16)
        .with_learning_rate(0.01)
        .with_batch_size(8)
        .with_epochs(200)
        .with_seed(3);
    nn.fit(&x, &y).expect("fit");
    let r2 = nn.score(&x, &y).expect("score");
    assert!(r2 > 0.95, "r2 = {r2}");
    assert!(nn.final_loss().expect("fitted") < 0.05);
}

#[test]
fn test_classification_learns_separable_data() {
    let (x, y) = separable_classification_data();
    let mut nn = NeuralNetwork::new(TaskMode::Classification)
        .with_activation(Activation::Relu)
        .with_optimizer(OptimizerKind::Adam)
        .with_units(8)
        .with_learning_rate(0.01)
        .with_batch_size(16)
        .with_epochs(100)
        .with_seed(11);
    nn.fit(&x, &y).expect("fit");

    let acc = nn.score(&x, &y).expect("score");
    assert!(acc >= 0.9, "accuracy = {acc}");

    let labels = nn.predict(&x).expect("predict");
    assert!(labels.iter().all(|v| v == 0.0 || v == 1.0));

    let proba = nn.predict_proba(&x).expect("proba");
    assert_eq!(proba.len(), 100);
    assert!(proba.iter().all(|p| (0.0..=1.0).contains(&p)));
}

#[test]
fn test_predict_proba_requires_classification() {
    let (x, y) = linear_regression_data();
    let mut nn = NeuralNetwork::new(TaskMode::Regression).with_epochs(1);
    nn.fit(&x, &y).expect("fit");
    assert!(nn.predict_proba(&x).is_err());
}

#[test]
fn test_same_seed_same_predictions() {
    let (x, y) = linear_regression_data();
    let build = || {
        NeuralNetwork::new(TaskMode::Regression)
            .with_optimizer(OptimizerKind::Rmsprop)
            .with_units(5)
            .with_epochs(10)
            .with_seed(99)
    };
    let mut a = build();
    let mut b = build();
    a.fit(&x, &y).expect("fit a");
    b.fit(&x, &y).expect("fit b");
    assert_eq!(
        a.predict(&x).expect("a").as_slice(),
        b.predict(&x).expect("b").as_slice()
    );
}

#[test]
fn test_predict_wrong_width() {
    let (x, y) = linear_regression_data();
    let mut nn = NeuralNetwork::new(TaskMode::Regression).with_epochs(1);
    nn.fit(&x, &y).expect("fit");
    assert!(matches!(
        nn.predict(&Matrix::zeros(2, 5)),
        Err(NngaError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_divergence_is_a_training_error() {
    let (x, y) = linear_regression_data();
    let mut nn = NeuralNetwork::new(TaskMode::Regression)
        .with_activation(Activation::Tanh)
        .with_optimizer(OptimizerKind::Sgd)
        .with_learning_rate(1e6)
        .with_epochs(50);
    assert!(matches!(nn.fit(&x, &y), Err(NngaError::Training(_))));
    assert!(!nn.is_fitted());
}

#[test]
fn test_every_optimizer_and_activation_trains() {
    let (x, y) = linear_regression_data();
    for act in Activation::ALL {
        for opt in OptimizerKind::ALL {
            let mut nn = NeuralNetwork::new(TaskMode::Regression)
                .with_activation(act)
                .with_optimizer(opt)
                .with_units(3)
                .with_epochs(2)
                .with_seed(5);
            nn.fit(&x, &y)
                .unwrap_or_else(|e| panic!("{act}/{opt} failed: {e}"));
            assert!(nn.predict(&x).expect("predict").is_finite());
        }
    }
}
