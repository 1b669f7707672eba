mod baseline;
mod double;
mod registry;
mod single;
pub mod surface;

pub use baseline::{Barnett, RandomModel, ServeReturnAverage};
pub use double::{
    Competitor, DoubleElo, DoubleGlicko2, DoubleModifiedGlicko, DoubleRatingModel,
    SURFACE_CONFIDENCE,
};
pub use registry::{Handle, Registry};
pub use single::ModifiedGlickoModel;

use crate::data_processing::{AnnotatedMatch, MatchRecord};
use crate::error::{Error, Result};
use crate::metrics;
use crate::optimizer::{NelderMead, OptimizeResult};
use std::collections::BTreeMap;

/// A predictor that walks through a date-ordered match log, emitting the win
/// probability of each match's winner before learning from its result.
///
/// Competitor state persists between calls. [`train`](Self::train) always starts
/// from a blank slate, while [`test`](Self::test) continues from wherever the
/// previous call left off, so that a model trained on past seasons can be tested
/// on the following ones in order.
pub trait RankingModel {
    fn name(&self) -> &'static str;

    /// All hyperparameters of the model by name.
    fn params(&self) -> BTreeMap<&'static str, f64>;

    fn set_param(&mut self, name: &str, value: f64) -> Result<()>;

    /// Names of the parameters fitted by [`train_params`](Self::train_params),
    /// in the order of the optimizer's vector.
    fn trainable_names(&self) -> &'static [&'static str];

    fn trainable_params(&self) -> Vec<f64> {
        let params = self.params();
        self.trainable_names()
            .iter()
            .filter_map(|name| params.get(name).copied())
            .collect()
    }

    fn apply_params(&mut self, x: &[f64]) -> Result<()> {
        let names = self.trainable_names();
        if names.len() != x.len() {
            return Err(Error::ParamCount {
                model: self.name(),
                expected: names.len(),
                actual: x.len(),
            });
        }
        for (name, &value) in names.iter().zip(x) {
            self.set_param(name, value)?;
        }
        Ok(())
    }

    /// Forgets every competitor.
    fn reset(&mut self);

    /// Predicts and then learns from each match in turn, starting from the current
    /// state. The output is parallel to `data`.
    fn run(&mut self, data: &[MatchRecord]) -> Vec<AnnotatedMatch>;

    /// Runs on `data` from a blank slate and returns the log-loss of its predictions.
    fn train(&mut self, data: &[MatchRecord]) -> f64 {
        self.reset();
        metrics::log_loss(&self.run(data))
    }

    /// Runs on `data` from the current state, without resetting.
    fn test(&mut self, data: &[MatchRecord]) -> Vec<AnnotatedMatch> {
        self.run(data)
    }

    /// The training loss when the trainable parameters are set to `x`.
    fn train_params_error(&mut self, x: &[f64], data: &[MatchRecord]) -> Result<f64> {
        self.apply_params(x)?;
        Ok(self.train(data))
    }

    /// Fits the trainable parameters to `data` by minimizing the training loss,
    /// starting from `approx`. The model is left trained with the best parameters.
    fn train_params(
        &mut self,
        data: &[MatchRecord],
        approx: &[f64],
        optimizer: &NelderMead,
    ) -> Result<OptimizeResult> {
        let expected = self.trainable_names().len();
        if expected == 0 {
            return Err(Error::NothingToTrain(self.name()));
        }
        if approx.len() != expected {
            return Err(Error::ParamCount {
                model: self.name(),
                expected,
                actual: approx.len(),
            });
        }

        tracing::info!(
            "Fitting {:?} of {} on {} matches from {:?}",
            self.trainable_names(),
            self.name(),
            data.len(),
            approx
        );
        let result = optimizer.minimize(
            |x| match self.train_params_error(x, data) {
                Ok(error) => {
                    tracing::debug!("Parameters: {:?}, Error: {}", x, error);
                    error
                }
                Err(err) => {
                    tracing::warn!("Failed to evaluate {:?}: {}", x, err);
                    f64::NAN
                }
            },
            approx,
        );

        self.train_params_error(&result.x, data)?;
        if result.success {
            tracing::info!("Best parameters {:?} with error {}", result.x, result.fun);
        } else {
            tracing::warn!("{}: best so far {:?} with error {}", result.message, result.x, result.fun);
        }
        Ok(result)
    }
}

pub const MODEL_NAMES: [&str; 7] = [
    "double-elo",
    "double-elo-surface",
    "double-modified-glicko",
    "double-glicko2",
    "modified-glicko",
    "barnett",
    "random",
];

/// Builds a model with its default parameters, then overrides those in `params`.
pub fn get_model_by_name(
    name: &str,
    params: &BTreeMap<String, f64>,
) -> Result<Box<dyn RankingModel + Send>> {
    let mut model: Box<dyn RankingModel + Send> = match name {
        "double-elo" => Box::new(DoubleElo::double_elo()),
        "double-elo-surface" => Box::new(DoubleElo::double_elo_surface()),
        "double-modified-glicko" => Box::new(DoubleModifiedGlicko::double_modified_glicko()),
        "double-glicko2" => Box::new(DoubleGlicko2::double_glicko2()),
        "modified-glicko" => Box::new(ModifiedGlickoModel::default()),
        "barnett" => Box::new(Barnett::default()),
        "random" => Box::new(RandomModel::default()),
        x => return Err(Error::UnknownModel(x.to_owned())),
    };
    for (param, &value) in params {
        model.set_param(param, value)?;
    }
    Ok(model)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_model_by_name() {
        for name in MODEL_NAMES {
            let model = get_model_by_name(name, &BTreeMap::new()).unwrap();
            assert_eq!(model.name(), name);
        }
        assert!(matches!(
            get_model_by_name("trueskill", &BTreeMap::new()),
            Err(Error::UnknownModel(_))
        ));

        let params = BTreeMap::from([("K".to_owned(), 20.), ("edge".to_owned(), 0.12)]);
        let model = get_model_by_name("double-elo", &params).unwrap();
        assert_eq!(model.params()["K"], 20.);
        assert_eq!(model.params()["edge"], 0.12);
        assert_eq!(model.params()["mu"], 1500.);

        assert!(matches!(
            get_model_by_name("barnett", &params),
            Err(Error::UnknownParam { model: "barnett", .. })
        ));
    }

    #[test]
    fn test_nothing_to_train() {
        let mut model = get_model_by_name("barnett", &BTreeMap::new()).unwrap();
        let result = model.train_params(&[], &[], &NelderMead::default());
        assert!(matches!(result, Err(Error::NothingToTrain("barnett"))));

        let mut model = get_model_by_name("double-elo", &BTreeMap::new()).unwrap();
        let result = model.train_params(&[], &[1., 2.], &NelderMead::default());
        assert!(matches!(
            result,
            Err(Error::ParamCount {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }
}
