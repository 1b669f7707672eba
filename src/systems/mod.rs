mod elo;
mod glicko2;
mod modified_glicko;

pub use elo::{Elo, EloRating};
pub use glicko2::{Glicko2, Glicko2Rating};
pub use modified_glicko::{DecayingRating, ModifiedGlicko};

/// Read-only view of a rating's point estimate and its uncertainty.
pub trait SkillEstimate {
    fn strength(&self) -> f64;
    /// Systems without an uncertainty measure report zero.
    fn uncertainty(&self) -> f64;
}

/// A two-player rating system over fractional results in `0.0..=1.0`.
///
/// Ratings are values: an update never mutates its inputs, it returns new ratings
/// derived from the pre-match values of both sides.
pub trait RatingSystem: std::fmt::Debug {
    type Rating: Copy + std::fmt::Debug + SkillEstimate;

    /// A rating with the system's default mean and uncertainty.
    fn create_rating(&self) -> Self::Rating;

    /// A rating with the given mean and the default uncertainty.
    fn create_rating_with_mean(&self, mu: f64) -> Self::Rating;

    /// Expected score of `player` against `foe`, strictly between 0 and 1.
    fn expect(&self, player: &Self::Rating, foe: &Self::Rating) -> f64;

    /// The new rating of `player` after scoring `result` against `foe`.
    fn rate(&self, player: &Self::Rating, foe: &Self::Rating, result: f64) -> Self::Rating;

    /// Updates both sides of a match in which `first` scored `result`.
    fn play_match(
        &self,
        first: &Self::Rating,
        second: &Self::Rating,
        result: f64,
    ) -> (Self::Rating, Self::Rating) {
        (
            self.rate(first, second, result),
            self.rate(second, first, 1. - result),
        )
    }
}

/// Named hyperparameters, settable by name like keyword arguments.
pub trait Hyperparameters {
    fn param_names(&self) -> &'static [&'static str];
    fn get_param(&self, name: &str) -> Option<f64>;
    /// Returns false if there's no parameter with this name.
    fn set_param(&mut self, name: &str, value: f64) -> bool;
}
