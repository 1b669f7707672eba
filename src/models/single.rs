use super::RankingModel;
use super::registry::Registry;
use crate::data_processing::{AnnotatedMatch, MatchRecord};
use crate::error::{Error, Result};
use crate::systems::{DecayingRating, Hyperparameters, ModifiedGlicko, RatingSystem};
use std::collections::BTreeMap;

/// One modified Glicko rating per player, updated only by who won each match.
/// Serve statistics are ignored, so no match is skipped.
#[derive(Debug)]
pub struct ModifiedGlickoModel {
    pub system: ModifiedGlicko,
    players: Registry<DecayingRating>,
}

impl Default for ModifiedGlickoModel {
    fn default() -> Self {
        let system = ModifiedGlicko {
            mu: 1500.,
            sigma_start: 300.,
            sigma_cap: 100.,
            c: 10.,
            q: 0.0057565,
        };
        Self {
            system,
            players: Registry::default(),
        }
    }
}

impl ModifiedGlickoModel {
    pub fn rating(&self, name: &str) -> Option<&DecayingRating> {
        self.players.get(name)
    }

    /// Confident predictions between established players are weighted more.
    fn bet_amount(winner: &DecayingRating, loser: &DecayingRating) -> f64 {
        (winner.sigma.recip() + loser.sigma.recip()) / (2. / winner.sigma_cap)
    }
}

impl RankingModel for ModifiedGlickoModel {
    fn name(&self) -> &'static str {
        "modified-glicko"
    }

    fn params(&self) -> BTreeMap<&'static str, f64> {
        self.system
            .param_names()
            .iter()
            .filter_map(|&name| Some((name, self.system.get_param(name)?)))
            .collect()
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        if self.system.set_param(name, value) {
            Ok(())
        } else {
            Err(Error::UnknownParam {
                model: self.name(),
                param: name.to_owned(),
            })
        }
    }

    fn trainable_names(&self) -> &'static [&'static str] {
        &["start_sigma", "end_sigma", "c"]
    }

    fn reset(&mut self) {
        self.players.clear();
    }

    fn run(&mut self, data: &[MatchRecord]) -> Vec<AnnotatedMatch> {
        let mut annotated = Vec::with_capacity(data.len());
        for record in data {
            let mut winner = self
                .players
                .checkout(&record.winner, || self.system.create_rating());
            let mut loser = self
                .players
                .checkout(&record.loser, || self.system.create_rating());

            let win_prob = self.system.expect(&winner, &loser);
            let bet_amount = Self::bet_amount(&winner, &loser);
            (*winner, *loser) = self.system.play_match(&winner, &loser, 1.);

            self.players.checkin(winner);
            self.players.checkin(loser);
            annotated.push(AnnotatedMatch {
                record: record.clone(),
                win_prob,
                bet_amount,
            });
        }
        annotated
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2010, 1, d).unwrap()
    }

    #[test]
    fn test_run_ignores_serve_stats() {
        let mut model = ModifiedGlickoModel::default();
        let data = [
            MatchRecord::new("A", "B", None, day(1)),
            MatchRecord::new("A", "B", Some((0.5, 0.7)), day(2)),
        ];
        let annotated = model.run(&data);

        assert_eq!(annotated[0].win_prob, 0.5);
        assert!((annotated[0].bet_amount - 1. / 3.).abs() < 1e-12);
        assert!(annotated[1].win_prob > 0.5);
        assert!(annotated[1].bet_amount > annotated[0].bet_amount);

        let a = model.rating("A").unwrap();
        let b = model.rating("B").unwrap();
        assert_eq!((a.t, b.t), (2, 2));
        assert!(a.rating > 1500. && b.rating < 1500.);
        assert_eq!(a.sigma, 280.);
    }

    #[test]
    fn test_params() {
        let mut model = ModifiedGlickoModel::default();
        assert_eq!(model.trainable_params(), vec![300., 100., 10.]);
        assert_eq!(model.params()["Q"], 0.0057565);
        model.apply_params(&[200., 50., 5.]).unwrap();
        assert_eq!(model.system.sigma_start, 200.);
        assert_eq!(model.system.sigma_cap, 50.);
        assert!(model.apply_params(&[1.]).is_err());
        assert!(model.set_param("edge", 0.1).is_err());
    }
}
