//! Reference models without ratings, to measure the rating models against.

use super::RankingModel;
use super::registry::Registry;
use crate::data_processing::{AnnotatedMatch, MatchRecord};
use crate::error::{Error, Result};
use crate::tennis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Running averages of a player's serve and return percentages, starting from one
/// pseudo-match at typical tour values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServeReturnAverage {
    ser: f64,
    ret: f64,
    n: u32,
}

impl Default for ServeReturnAverage {
    fn default() -> Self {
        Self {
            ser: 0.6,
            ret: 0.4,
            n: 1,
        }
    }
}

impl ServeReturnAverage {
    pub fn get(&self) -> (f64, f64) {
        let n = self.n as f64;
        (self.ser / n, self.ret / n)
    }

    pub fn add(&mut self, ser: f64, ret: f64) {
        self.ser += ser;
        self.ret += ret;
        self.n += 1;
    }
}

/// Barnett and Clarke's model: a player's serve percentage against an opponent is
/// their average serve percentage, lowered by how much the opponent's share of
/// return points won exceeds the tour average.
#[derive(Debug, Default)]
pub struct Barnett {
    players: Registry<ServeReturnAverage>,
}

impl Barnett {
    /// The tour-wide average share of return points won.
    pub const AVERAGE_RETURN: f64 = 0.4;

    pub fn average(&self, name: &str) -> Option<&ServeReturnAverage> {
        self.players.get(name)
    }
}

fn no_params(model: &'static str, name: &str) -> Result<()> {
    Err(Error::UnknownParam {
        model,
        param: name.to_owned(),
    })
}

impl RankingModel for Barnett {
    fn name(&self) -> &'static str {
        "barnett"
    }

    fn params(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::new()
    }

    fn set_param(&mut self, name: &str, _value: f64) -> Result<()> {
        no_params(self.name(), name)
    }

    fn trainable_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn reset(&mut self) {
        self.players.clear();
    }

    fn run(&mut self, data: &[MatchRecord]) -> Vec<AnnotatedMatch> {
        let mut annotated = Vec::with_capacity(data.len());
        for record in data {
            let mut winner = self.players.checkout(&record.winner, Default::default);
            let mut loser = self.players.checkout(&record.loser, Default::default);

            let (win_prob, bet_amount) = match record.serve_pcts() {
                Some((wsp1, wsp2)) => {
                    let (s1, r1) = winner.get();
                    let (s2, r2) = loser.get();
                    let p = s1 - (r2 - Self::AVERAGE_RETURN);
                    let q = s2 - (r1 - Self::AVERAGE_RETURN);
                    winner.add(wsp1, 1. - wsp2);
                    loser.add(wsp2, 1. - wsp1);
                    (tennis::match_probability(p, q, record.best_of), 1.)
                }
                None => (0.5, 0.),
            };

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

/// Predicts uniformly random probabilities. Resetting restarts the random stream.
#[derive(Debug)]
pub struct RandomModel {
    seed: u64,
    rng: StdRng,
}

impl RandomModel {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomModel {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RankingModel for RandomModel {
    fn name(&self) -> &'static str {
        "random"
    }

    fn params(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([("seed", self.seed as f64)])
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        if name != "seed" {
            return no_params(self.name(), name);
        }
        *self = Self::new(value as u64);
        Ok(())
    }

    fn trainable_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn run(&mut self, data: &[MatchRecord]) -> Vec<AnnotatedMatch> {
        data.iter()
            .map(|record| AnnotatedMatch {
                record: record.clone(),
                win_prob: self.rng.random(),
                bet_amount: 1.,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 2, d).unwrap()
    }

    #[test]
    fn test_barnett_averages() {
        let mut model = Barnett::default();
        let data = [
            MatchRecord::new("A", "B", Some((0.7, 0.5)), day(1)),
            MatchRecord::new("A", "B", None, day(2)),
            MatchRecord::new("A", "B", Some((0.7, 0.5)), day(3)),
        ];
        let annotated = model.run(&data);

        // Everyone starts at the seed averages, so the first match is a coin flip
        let seeded = tennis::match_probability(0.6, 0.6, 3);
        assert!((annotated[0].win_prob - seeded).abs() < 1e-12);
        assert_eq!((annotated[1].win_prob, annotated[1].bet_amount), (0.5, 0.));
        // A now serves at 0.65 and returns at 0.45, B at 0.55 and 0.35
        let expected = tennis::match_probability(0.65 - 0.35 + 0.4, 0.55 - 0.45 + 0.4, 3);
        assert!((annotated[2].win_prob - expected).abs() < 1e-12);
        assert!(annotated[2].win_prob > 0.5);

        let (ser, ret) = model.average("A").unwrap().get();
        assert!((ser - (0.6 + 0.7 + 0.7) / 3.).abs() < 1e-12);
        assert!((ret - (0.4 + 0.5 + 0.5) / 3.).abs() < 1e-12);
        assert!(model.trainable_params().is_empty());
    }

    #[test]
    fn test_strong_returners_are_harder_to_beat() {
        // E holds serve at 0.6 against a sparring partner and wins `ret` of the
        // return points, then A beats E
        let win_prob_against = |ret: f64| {
            let mut model = Barnett::default();
            let data = [
                MatchRecord::new("E", "Partner", Some((0.6, 1. - ret)), day(1)),
                MatchRecord::new("A", "E", Some((0.65, 0.55)), day(2)),
            ];
            model.run(&data)[1].win_prob
        };
        let strong = win_prob_against(0.5);
        let weak = win_prob_against(0.3);
        assert!(strong < 0.5, "{}", strong);
        assert!(weak > 0.5, "{}", weak);
    }

    #[test]
    fn test_random_is_reproducible() {
        let data: Vec<_> = (1..=5)
            .map(|d| MatchRecord::new("A", "B", None, day(d)))
            .collect();
        let mut model = RandomModel::new(99);
        let first = model.train(&data);
        let second = model.train(&data);
        assert_eq!(first, second);

        let probs: Vec<f64> = model.test(&data).iter().map(|m| m.win_prob).collect();
        assert!(probs.iter().all(|&p| (0. ..1.).contains(&p)));
        model.set_param("seed", 7.).unwrap();
        assert_eq!(model.params()["seed"], 7.);
        assert!(model.set_param("K", 1.).is_err());
    }
}
