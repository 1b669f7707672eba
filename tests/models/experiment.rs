use crate::helpers::{synthetic_matches, temp_path};
use tennis_skill::data_processing::read_matches_csv;
use tennis_skill::experiment_config::Experiment;
use tennis_skill::optimizer::NelderMead;

fn write_matches_csv(path: &std::path::Path, len: usize, seed: u64) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    for record in synthetic_matches(len, seed) {
        writer.serialize(record).unwrap();
    }
    writer.flush().unwrap();
}

#[test]
fn csv_round_trip_keeps_missing_stats_missing() {
    let path = temp_path("round_trip.csv");
    write_matches_csv(&path, 30, 8);
    let matches = read_matches_csv(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(matches, synthetic_matches(30, 8));
    assert_eq!(matches[12].serve_pcts(), None);
}

#[test]
fn experiment_trains_then_tests_each_year() {
    // Arrange
    let csv_path = temp_path("experiment.csv");
    let config_path = temp_path("experiment.json5");
    let predictions_path = temp_path("predictions.csv");
    write_matches_csv(&csv_path, 1500, 9);
    let config = format!(
        r#"{{
            model: {{ name: "double-elo", params: {{ K: 15 }} }},
            match_source: {:?},
            train_until: "2012-01-01",
            test_years: [2012, 2013],
            save_predictions: {:?},
        }}"#,
        csv_path, predictions_path
    );
    std::fs::write(&config_path, config).unwrap();

    // Act
    let mut experiment = Experiment::from_file(&config_path).unwrap();
    let fit = experiment.fit(&NelderMead::default()).unwrap();
    let results = experiment.eval();

    // Assert
    assert_eq!(results.model, "double-elo");
    assert_eq!(results.params["K"], fit.x[0]);
    assert!((results.train_error - fit.fun).abs() < 1e-9);
    assert_eq!(results.yearly.len(), 2);
    assert_eq!(results.yearly[0].matches, 366);
    assert_eq!(results.yearly[1].matches, 365);
    assert_eq!(results.test_report.metrics_wt_sum[0].0, 731.);
    for year in &results.yearly {
        assert!(year.accuracy > 0.5 && year.accuracy <= 1.);
    }
    let (lo, hi) = results.accuracy_ci;
    assert!(lo <= results.accuracy_mean && results.accuracy_mean <= hi);
    assert!(std::fs::metadata(&predictions_path).is_ok());

    for path in [csv_path, config_path, predictions_path] {
        std::fs::remove_file(path).unwrap();
    }
}
