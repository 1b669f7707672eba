use crate::helpers::synthetic_matches;
use std::collections::BTreeMap;
use tennis_skill::models::{MODEL_NAMES, get_model_by_name};

#[test]
fn train_always_starts_from_scratch() {
    let data = synthetic_matches(400, 1);
    for name in MODEL_NAMES {
        // Arrange
        let mut model = get_model_by_name(name, &BTreeMap::new()).unwrap();

        // Act
        let first = model.train(&data);
        model.test(&data);
        let second = model.train(&data);

        // Assert
        assert!(first.is_finite(), "{} gave {}", name, first);
        assert_eq!(first, second, "{} kept state across train calls", name);
    }
}

#[test]
fn test_continues_from_previous_state() {
    let data = synthetic_matches(400, 2);
    let (past, future) = data.split_at(250);
    for name in MODEL_NAMES {
        let mut model = get_model_by_name(name, &BTreeMap::new()).unwrap();

        // Training then testing is the same as one pass over everything
        model.reset();
        let whole = model.test(&data);
        model.train(past);
        let chained = model.test(future);
        let whole_probs: Vec<f64> = whole[250..].iter().map(|m| m.win_prob).collect();
        let chained_probs: Vec<f64> = chained.iter().map(|m| m.win_prob).collect();
        assert_eq!(whole_probs, chained_probs, "{}", name);
    }

    // Without the past, predictions on the future are different
    let mut model = get_model_by_name("double-elo", &BTreeMap::new()).unwrap();
    model.train(past);
    let informed = model.test(future);
    model.reset();
    let uninformed = model.test(future);
    assert_ne!(informed[0].win_prob, uninformed[0].win_prob);
}

#[test]
fn matches_without_serve_stats_change_nothing() {
    let data = synthetic_matches(300, 3);
    let complete: Vec<_> = data
        .iter()
        .filter(|record| record.serve_pcts().is_some())
        .cloned()
        .collect();
    assert!(complete.len() < data.len());

    for name in ["double-elo", "double-elo-surface", "double-glicko2", "barnett"] {
        let mut model = get_model_by_name(name, &BTreeMap::new()).unwrap();
        let with_gaps = model.test(&data);
        model.reset();
        let without_gaps = model.test(&complete);

        let gap_probs: Vec<f64> = with_gaps
            .iter()
            .filter(|m| m.bet_amount > 0.)
            .map(|m| m.win_prob)
            .collect();
        let probs: Vec<f64> = without_gaps.iter().map(|m| m.win_prob).collect();
        assert_eq!(gap_probs, probs, "{}", name);

        let skipped = with_gaps.iter().filter(|m| m.bet_amount == 0.);
        assert!(skipped.clone().all(|m| m.win_prob == 0.5));
        assert_eq!(skipped.count(), data.len() - complete.len());
    }
}

#[test]
fn models_beat_coin_flips() {
    let data = synthetic_matches(1500, 4);
    let coin_flips = data.len() as f64 * 2f64.ln();
    for name in ["double-elo", "double-modified-glicko", "double-glicko2", "barnett"] {
        let mut model = get_model_by_name(name, &BTreeMap::new()).unwrap();
        let error = model.train(&data);
        assert!(error < coin_flips, "{}: {} vs {}", name, error, coin_flips);
    }
}
