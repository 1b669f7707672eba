use crate::data_processing::AnnotatedMatch;
use crate::numerical::student_t_critical;
use overload::overload;
use serde::Serialize;
use std::fmt;
use std::ops;

pub type WeightAndSum = (f64, f64);

pub const METRIC_NAMES: [&str; 4] = ["log-loss", "accuracy", "bias", "sqme"];

// A data structure for storing the various performance metrics we want to analyze
#[derive(Clone, Debug, Serialize)]
pub struct PerformanceReport {
    pub metrics_wt_sum: Vec<WeightAndSum>,
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let averaged: Vec<f64> = self.averages();
        write!(f, "{:?}", averaged)
    }
}

impl PerformanceReport {
    pub fn new(num_metrics: usize) -> Self {
        Self {
            metrics_wt_sum: vec![(0., 0.); num_metrics],
        }
    }

    pub fn averages(&self) -> Vec<f64> {
        self.metrics_wt_sum
            .iter()
            .map(|&(wt, sum)| sum / wt)
            .collect()
    }
}

overload!((a: ?PerformanceReport) + (b: ?PerformanceReport) -> PerformanceReport {
    assert_eq!(a.metrics_wt_sum.len(), b.metrics_wt_sum.len());
    let metrics_wt_sum = a.metrics_wt_sum.iter().zip(b.metrics_wt_sum.iter()).map(|((a_w, a_sum), (b_w, b_sum))| (a_w+b_w, a_sum+b_sum)).collect();
    PerformanceReport {
        metrics_wt_sum
    }
});

overload!((a: &mut PerformanceReport) += (b: ?PerformanceReport) {
    assert_eq!(a.metrics_wt_sum.len(), b.metrics_wt_sum.len());
    for ((a_w, a_sum), (b_w, b_sum)) in a.metrics_wt_sum.iter_mut().zip(b.metrics_wt_sum.iter()) {
        *a_w += b_w;
        *a_sum += b_sum;
    }
});

/// Total negative log-likelihood of the observed winners.
pub fn log_loss(data: &[AnnotatedMatch]) -> f64 {
    data.iter().map(|m| -m.win_prob.ln()).sum()
}

fn log_loss_metric(data: &[AnnotatedMatch]) -> WeightAndSum {
    (data.len() as f64, log_loss(data))
}

// Predictions of exactly zero are treated as abstentions
fn accuracy_metric(data: &[AnnotatedMatch]) -> WeightAndSum {
    let considered = data.iter().filter(|m| m.win_prob > 0.).count();
    let correct = data.iter().filter(|m| m.win_prob > 0.5).count();
    (considered as f64, correct as f64)
}

fn bias_metric(data: &[AnnotatedMatch]) -> WeightAndSum {
    let sum = data.iter().map(|m| 1. - m.win_prob).sum();
    (data.len() as f64, sum)
}

fn sqme_metric(data: &[AnnotatedMatch]) -> WeightAndSum {
    let sum = data.iter().map(|m| (1. - m.win_prob).powi(2)).sum();
    (data.len() as f64, sum)
}

/// Share of correct predictions, among those with a positive win probability.
pub fn accuracy(data: &[AnnotatedMatch]) -> f64 {
    let (considered, correct) = accuracy_metric(data);
    correct / considered
}

/// Mean probability mass given to the loser.
pub fn bias(data: &[AnnotatedMatch]) -> f64 {
    let (n, sum) = bias_metric(data);
    sum / n
}

/// Mean squared error of the predictions.
pub fn sqme(data: &[AnnotatedMatch]) -> f64 {
    let (n, sum) = sqme_metric(data);
    sum / n
}

pub fn compute_metrics(data: &[AnnotatedMatch]) -> PerformanceReport {
    let metrics_wt_sum = vec![
        log_loss_metric(data),
        accuracy_metric(data),
        bias_metric(data),
        sqme_metric(data),
    ];
    PerformanceReport { metrics_wt_sum }
}

/// The outcome of betting against bookmaker odds whenever the model's fair odds,
/// plus a margin, are shorter than the offered odds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Profitability {
    pub bets: usize,
    pub staked: f64,
    pub returned: f64,
}

impl Profitability {
    /// Return on investment.
    pub fn roi(&self) -> f64 {
        self.returned / self.staked - 1.
    }
}

/// Bets `bet_amount` on the winner when `k + 1/win_prob` is below the winner's
/// odds, and on the loser when `k + 1/(1 - win_prob)` is below the loser's odds.
/// Matches without odds are skipped. If nothing is staked, the result is a
/// neutral `(1, 1, 1)`.
pub fn profitability(data: &[AnnotatedMatch], k: f64) -> Profitability {
    let mut result = Profitability {
        bets: 0,
        staked: 0.,
        returned: 0.,
    };
    for m in data {
        let winner_odds = m.record.winner_odds.unwrap_or(f64::NAN);
        let loser_odds = m.record.loser_odds.unwrap_or(f64::NAN);
        if k + m.win_prob.recip() < winner_odds && m.bet_amount > 0. {
            result.bets += 1;
            result.staked += m.bet_amount;
            result.returned += m.bet_amount * winner_odds;
        }
        if k + (1. - m.win_prob).recip() < loser_odds && m.bet_amount > 0. {
            result.bets += 1;
            result.staked += m.bet_amount;
        }
    }

    if result.staked == 0. {
        Profitability {
            bets: 1,
            staked: 1.,
            returned: 1.,
        }
    } else {
        result
    }
}

/// Two-sided Student-t confidence interval around `mean`, given a standard
/// deviation estimated from `samples` observations.
pub fn confidence_interval(mean: f64, std: f64, samples: usize, confidence: f64) -> (f64, f64) {
    let freedom = samples.saturating_sub(1).max(1) as f64;
    let h = std * student_t_critical(confidence, freedom);
    (mean - h, mean + h)
}
