use crate::data_processing::{self, AnnotatedMatch, MatchRecord, read_matches_csv};
use crate::error::{Error, Result};
use crate::metrics::{
    METRIC_NAMES, PerformanceReport, Profitability, accuracy, compute_metrics,
    confidence_interval, log_loss, profitability,
};
use crate::models::{RankingModel, get_model_by_name};
use crate::numerical::weighted_avg_and_std;
use crate::optimizer::{NelderMead, OptimizeResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};

/// Confidence level of the intervals reported across test years.
pub const REPORT_CONFIDENCE: f64 = 0.95;

#[derive(Deserialize, Debug)]
pub struct ModelConfig {
    pub name: String,
    /// Overrides of the model's default parameters.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

#[derive(Deserialize, Debug)]
pub struct ExperimentConfig {
    pub model: ModelConfig,
    pub match_source: PathBuf,
    pub train_from: Option<NaiveDate>,
    /// Exclusive end of the training window.
    pub train_until: NaiveDate,
    /// Calendar years to test on, in order, after training.
    #[serde(default)]
    pub test_years: Vec<i32>,
    pub save_predictions: Option<PathBuf>,
    /// Extra margin demanded of the odds before placing a bet.
    #[serde(default)]
    pub betting_margin: f64,
}

impl ExperimentConfig {
    pub fn from_file(source: impl AsRef<Path>) -> Result<Self> {
        // Use json5 instead of serde_json to allow comments and trailing commas
        let source = source.as_ref();
        let params_json =
            std::fs::read_to_string(source).map_err(|err| Error::io(source, err))?;
        Ok(json5::from_str(&params_json)?)
    }
}

/// Parses a command-line parameter override of the form `name=value`.
pub fn parse_param(arg: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {}", arg))?;
    let value = value
        .trim()
        .parse()
        .map_err(|err| format!("invalid value for {}: {}", name, err))?;
    Ok((name.trim().to_owned(), value))
}

pub struct Experiment {
    // Experiment should implement Send so that it can be sent across threads
    pub model: Box<dyn RankingModel + Send>,
    pub matches: Vec<MatchRecord>,
    pub train_from: Option<NaiveDate>,
    pub train_until: NaiveDate,
    pub test_years: Vec<i32>,
    pub save_predictions: Option<PathBuf>,
    pub betting_margin: f64,
}

/// One row of saved predictions.
#[derive(Serialize, Debug)]
pub struct Prediction<'a> {
    pub date: NaiveDate,
    pub tournament: &'a str,
    pub winner: &'a str,
    pub loser: &'a str,
    pub win_prob: f64,
    pub bet_amount: f64,
}

impl<'a> From<&'a AnnotatedMatch> for Prediction<'a> {
    fn from(annotated: &'a AnnotatedMatch) -> Self {
        Self {
            date: annotated.record.date,
            tournament: &annotated.record.tournament,
            winner: &annotated.record.winner,
            loser: &annotated.record.loser,
            win_prob: annotated.win_prob,
            bet_amount: annotated.bet_amount,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct YearResult {
    pub year: i32,
    pub matches: usize,
    pub report: PerformanceReport,
    pub accuracy: f64,
    pub betting: Profitability,
    pub roi: f64,
}

#[derive(Serialize, Debug)]
pub struct ExperimentResults {
    pub model: &'static str,
    pub params: BTreeMap<&'static str, f64>,
    pub train_error: f64,
    pub train_report: PerformanceReport,
    pub yearly: Vec<YearResult>,
    /// Metrics pooled over all test years.
    pub test_report: PerformanceReport,
    pub accuracy_mean: f64,
    pub accuracy_std: f64,
    pub accuracy_ci: (f64, f64),
    pub roi_mean: f64,
    pub roi_std: f64,
    pub roi_ci: (f64, f64),
    pub secs_elapsed: f64,
}

/// The matches dated within `[from, until)`.
fn training_window(
    matches: &[MatchRecord],
    from: Option<NaiveDate>,
    until: NaiveDate,
) -> &[MatchRecord] {
    let start = match from {
        Some(date) => Bound::Included(date),
        None => Bound::Unbounded,
    };
    data_processing::date_range(matches, (start, Bound::Excluded(until)))
}

impl Experiment {
    pub fn from_config(config: ExperimentConfig) -> Result<Self> {
        tracing::info!("Loading model:\n{:?}", config);
        let model = get_model_by_name(&config.model.name, &config.model.params)?;
        let matches = read_matches_csv(&config.match_source)?;

        Ok(Self {
            model,
            matches,
            train_from: config.train_from,
            train_until: config.train_until,
            test_years: config.test_years,
            save_predictions: config.save_predictions,
            betting_margin: config.betting_margin,
        })
    }

    pub fn from_file(source: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(ExperimentConfig::from_file(source)?)
    }

    /// Fits the model's trainable parameters on the training window, starting from
    /// their current values.
    pub fn fit(&mut self, optimizer: &NelderMead) -> Result<OptimizeResult> {
        let approx = self.model.trainable_params();
        let train_data = training_window(&self.matches, self.train_from, self.train_until);
        self.model.train_params(train_data, &approx, optimizer)
    }

    /// Trains on the training window, then tests on each test year in order,
    /// carrying the competitors' state from one year to the next.
    pub fn eval(&mut self) -> ExperimentResults {
        let now = std::time::Instant::now();
        let train_data = training_window(&self.matches, self.train_from, self.train_until);
        // Same as `train`, but keeps the predictions for the report
        self.model.reset();
        let trained = self.model.test(train_data);
        let train_error = log_loss(&trained);
        let train_report = compute_metrics(&trained);
        tracing::info!(
            "Trained {} on {} matches with error {}",
            self.model.name(),
            trained.len(),
            train_error
        );

        let mut predictions = vec![];
        let mut test_report = PerformanceReport::new(METRIC_NAMES.len());
        let mut yearly = Vec::with_capacity(self.test_years.len());
        for &year in &self.test_years {
            let test_data = data_processing::year(&self.matches, year);
            let tested = self.model.test(test_data);
            let betting = profitability(&tested, self.betting_margin);
            let result = YearResult {
                year,
                matches: tested.len(),
                report: compute_metrics(&tested),
                accuracy: accuracy(&tested),
                betting,
                roi: betting.roi(),
            };
            tracing::info!(
                "Year {}: accuracy {:.5}, {} bets with ROI {:.5}",
                year,
                result.accuracy,
                betting.bets,
                result.roi
            );
            test_report += &result.report;
            yearly.push(result);
            predictions.extend(tested);
        }
        let secs_elapsed = now.elapsed().as_nanos() as f64 * 1e-9;

        let accuracies: Vec<f64> = yearly.iter().map(|y| y.accuracy).collect();
        let (accuracy_mean, accuracy_std) =
            weighted_avg_and_std(&accuracies, &vec![1.; accuracies.len()]);
        let accuracy_ci =
            confidence_interval(accuracy_mean, accuracy_std, yearly.len(), REPORT_CONFIDENCE);

        let rois: Vec<f64> = yearly.iter().map(|y| y.roi).collect();
        let bets: Vec<f64> = yearly.iter().map(|y| y.betting.bets as f64).collect();
        let (roi_mean, roi_std) = weighted_avg_and_std(&rois, &bets);
        let roi_ci = confidence_interval(roi_mean, roi_std, yearly.len(), REPORT_CONFIDENCE);

        if let Some(path) = &self.save_predictions {
            let rows: Vec<Prediction> = predictions.iter().map(Prediction::from).collect();
            data_processing::write_slice_to_file(&rows, path);
        }

        ExperimentResults {
            model: self.model.name(),
            params: self.model.params(),
            train_error,
            train_report,
            yearly,
            test_report,
            accuracy_mean,
            accuracy_std,
            accuracy_ci,
            roi_mean,
            roi_std,
            roi_ci,
            secs_elapsed,
        }
    }
}
