//! A Glicko variant which accepts any result between 0 and 1, and whose rating
//! deviation never increases: it shrinks linearly with the number of matches played
//! until it reaches a floor. Players rarely leave and return in professional tennis,
//! so there's no need to model growing uncertainty during inactivity.

use super::{Hyperparameters, RatingSystem, SkillEstimate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecayingRating {
    pub rating: f64,
    pub sigma_start: f64,
    pub sigma_cap: f64,
    pub c: f64,
    /// Number of updates so far
    pub t: u32,
    pub sigma: f64,
}

impl DecayingRating {
    pub fn new(rating: f64, sigma_start: f64, sigma_cap: f64, c: f64) -> Self {
        let mut fresh = Self {
            rating,
            sigma_start,
            sigma_cap,
            c,
            t: 0,
            sigma: sigma_start,
        };
        fresh.sigma = fresh.get_sigma();
        fresh
    }

    /// The deviation after `t` updates; recomputed rather than accumulated.
    pub fn get_sigma(&self) -> f64 {
        (self.sigma_start - self.t as f64 * self.c).max(self.sigma_cap)
    }

    /// A copy of this rating moved to `new_rating`, one match older.
    pub fn updated(&self, new_rating: f64) -> Self {
        let mut next = Self {
            rating: new_rating,
            t: self.t + 1,
            ..*self
        };
        next.sigma = next.get_sigma();
        next
    }
}

impl SkillEstimate for DecayingRating {
    fn strength(&self) -> f64 {
        self.rating
    }

    fn uncertainty(&self) -> f64 {
        self.sigma
    }
}

#[derive(Clone, Debug)]
pub struct ModifiedGlicko {
    pub mu: f64,
    pub sigma_start: f64,
    // smallest possible deviation
    pub sigma_cap: f64,
    // deviation decrement per match
    pub c: f64,
    // rating modification factor, ln(10)/400 in standard Glicko
    pub q: f64,
}

impl Default for ModifiedGlicko {
    fn default() -> Self {
        Self {
            mu: 1500.,
            sigma_start: 350.,
            sigma_cap: 100.,
            c: 20.,
            q: 0.0057565,
        }
    }
}

impl ModifiedGlicko {
    /// A rating whose decay schedule differs from the system's defaults.
    pub fn create_rating_custom(
        &self,
        mu: f64,
        sigma_start: f64,
        sigma_cap: f64,
        c: f64,
    ) -> DecayingRating {
        DecayingRating::new(mu, sigma_start, sigma_cap, c)
    }

    /// The factor `g(RD)` which discounts games against uncertain opponents.
    pub fn impact(&self, rating: &DecayingRating) -> f64 {
        (1. + 3. * self.q.powi(2) * rating.sigma.powi(2) / PI.powi(2))
            .sqrt()
            .recip()
    }
}

impl RatingSystem for ModifiedGlicko {
    type Rating = DecayingRating;

    fn create_rating(&self) -> DecayingRating {
        self.create_rating_with_mean(self.mu)
    }

    fn create_rating_with_mean(&self, mu: f64) -> DecayingRating {
        self.create_rating_custom(mu, self.sigma_start, self.sigma_cap, self.c)
    }

    fn expect(&self, player: &DecayingRating, foe: &DecayingRating) -> f64 {
        let impact = self.impact(foe);
        let exponent = -impact * (player.rating - foe.rating) / 400.;
        (1. + 10f64.powf(exponent)).recip()
    }

    fn rate(&self, player: &DecayingRating, foe: &DecayingRating, result: f64) -> DecayingRating {
        let expected = self.expect(player, foe);
        let impact = self.impact(foe);
        let d_sq = (self.q.powi(2) * impact.powi(2) * expected * (1. - expected)).recip();
        let change =
            self.q / (player.sigma.powi(-2) + d_sq.recip()) * impact * (result - expected);
        player.updated(player.rating + change)
    }
}

impl Hyperparameters for ModifiedGlicko {
    fn param_names(&self) -> &'static [&'static str] {
        &["mu", "start_sigma", "end_sigma", "c", "Q"]
    }

    fn get_param(&self, name: &str) -> Option<f64> {
        match name {
            "mu" => Some(self.mu),
            "start_sigma" => Some(self.sigma_start),
            "end_sigma" => Some(self.sigma_cap),
            "c" => Some(self.c),
            "Q" => Some(self.q),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "mu" => self.mu = value,
            "start_sigma" => self.sigma_start = value,
            "end_sigma" => self.sigma_cap = value,
            "c" => self.c = value,
            "Q" => self.q = value,
            _ => return false,
        }
        true
    }
}
