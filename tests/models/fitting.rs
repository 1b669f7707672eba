use crate::helpers::synthetic_matches;
use std::collections::BTreeMap;
use tennis_skill::models::{DoubleElo, RankingModel, get_model_by_name};
use tennis_skill::optimizer::NelderMead;

#[test]
fn train_params_never_worsens_the_starting_point() {
    // Arrange
    let data = synthetic_matches(300, 5);
    let mut model = DoubleElo::double_elo();
    let approx = [30.];
    let start_error = model.train_params_error(&approx, &data).unwrap();

    // Act
    let result = model.train_params(&data, &approx, &NelderMead::default()).unwrap();

    // Assert
    assert!(result.fun <= start_error);
    assert_eq!(result.x.len(), 1);
    assert_eq!(model.params()["K"], result.x[0]);
    assert_eq!(model.train(&data), result.fun);
}

#[test]
fn train_params_fits_several_parameters() {
    let data = synthetic_matches(300, 6);
    let mut model = get_model_by_name("double-modified-glicko", &BTreeMap::new()).unwrap();
    let approx = model.trainable_params();
    let start_error = model.train_params_error(&approx, &data).unwrap();

    let optimizer = NelderMead {
        max_iter: Some(30),
        ..Default::default()
    };
    let result = model.train_params(&data, &approx, &optimizer).unwrap();
    assert!(result.fun <= start_error);
    assert!(result.nit <= 30);
    assert_eq!(model.trainable_params(), result.x);
}

#[test]
fn train_params_rejects_bad_requests() {
    let data = synthetic_matches(10, 7);
    let mut model = get_model_by_name("random", &BTreeMap::new()).unwrap();
    assert!(model.train_params(&data, &[], &NelderMead::default()).is_err());

    let mut model = get_model_by_name("double-glicko2", &BTreeMap::new()).unwrap();
    assert!(model.train_params(&data, &[300.], &NelderMead::default()).is_err());
}
