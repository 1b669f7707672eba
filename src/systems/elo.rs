//! Elo system details: https://en.wikipedia.org/wiki/Elo_rating_system

use super::{Hyperparameters, RatingSystem, SkillEstimate};
use crate::numerical::elo_logistic;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    pub rating: f64,
}

impl SkillEstimate for EloRating {
    fn strength(&self) -> f64 {
        self.rating
    }

    fn uncertainty(&self) -> f64 {
        0.
    }
}

#[derive(Clone, Debug)]
pub struct Elo {
    pub mu: f64,
    // rating change per unit of surprise
    pub k: f64,
}

impl Default for Elo {
    fn default() -> Self {
        Self { mu: 1500., k: 32. }
    }
}

impl RatingSystem for Elo {
    type Rating = EloRating;

    fn create_rating(&self) -> EloRating {
        self.create_rating_with_mean(self.mu)
    }

    fn create_rating_with_mean(&self, mu: f64) -> EloRating {
        EloRating { rating: mu }
    }

    fn expect(&self, player: &EloRating, foe: &EloRating) -> f64 {
        elo_logistic(player.rating - foe.rating)
    }

    fn rate(&self, player: &EloRating, foe: &EloRating, result: f64) -> EloRating {
        let expected = self.expect(player, foe);
        EloRating {
            rating: player.rating + self.k * (result - expected),
        }
    }
}

impl Hyperparameters for Elo {
    fn param_names(&self) -> &'static [&'static str] {
        &["mu", "K"]
    }

    fn get_param(&self, name: &str) -> Option<f64> {
        match name {
            "mu" => Some(self.mu),
            "K" => Some(self.k),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "mu" => self.mu = value,
            "K" => self.k = value,
            _ => return false,
        }
        true
    }
}
