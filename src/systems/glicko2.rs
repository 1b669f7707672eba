//! Glicko-2 system details: http://www.glicko.net/glicko/glicko2.pdf
//!
//! Every match is treated as its own rating period, and results may be fractional.

use super::{Hyperparameters, RatingSystem, SkillEstimate};
use crate::numerical::standard_logistic_cdf;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Conversion factor between the display scale and the internal Glicko-2 scale.
const RATIO: f64 = 173.7178;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Rating {
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl SkillEstimate for Glicko2Rating {
    fn strength(&self) -> f64 {
        self.rating
    }

    fn uncertainty(&self) -> f64 {
        self.deviation
    }
}

#[derive(Clone, Debug)]
pub struct Glicko2 {
    pub mu: f64,
    pub phi: f64,
    pub sigma: f64,
    // constrains the change in volatility over time
    pub tau: f64,
    // convergence tolerance of the volatility iteration
    pub eps: f64,
}

impl Default for Glicko2 {
    fn default() -> Self {
        Self {
            mu: 1500.,
            phi: 350.,
            sigma: 0.06,
            tau: 1.,
            eps: 1e-6,
        }
    }
}

// A rating on the internal scale, centered on the system mean
#[derive(Clone, Copy, Debug)]
struct Scaled {
    mu: f64,
    phi: f64,
    sigma: f64,
}

impl Glicko2 {
    fn scale_down(&self, rating: &Glicko2Rating) -> Scaled {
        Scaled {
            mu: (rating.rating - self.mu) / RATIO,
            phi: rating.deviation / RATIO,
            sigma: rating.volatility,
        }
    }

    fn scale_up(&self, rating: Scaled) -> Glicko2Rating {
        Glicko2Rating {
            rating: rating.mu * RATIO + self.mu,
            deviation: rating.phi * RATIO,
            volatility: rating.sigma,
        }
    }

    fn reduce_impact(phi: f64) -> f64 {
        (1. + 3. * phi * phi / (PI * PI)).sqrt().recip()
    }

    /// The new volatility, found with the Illinois variant of regula falsi.
    fn determine_sigma(&self, rating: &Scaled, difference: f64, variance: f64) -> f64 {
        let phi_sq = rating.phi * rating.phi;
        let diff_sq = difference * difference;
        let tau_sq = self.tau * self.tau;
        let alpha = (rating.sigma * rating.sigma).ln();
        let f = |x: f64| {
            let ex = x.exp();
            let tmp = phi_sq + variance + ex;
            ex * (diff_sq - tmp) / (2. * tmp * tmp) - (x - alpha) / tau_sq
        };

        let mut a = alpha;
        let mut b = if diff_sq > phi_sq + variance {
            (diff_sq - phi_sq - variance).ln()
        } else {
            let mut k = 1.;
            while f(alpha - k * self.tau) < 0. {
                k += 1.;
            }
            alpha - k * self.tau
        };

        let (mut f_a, mut f_b) = (f(a), f(b));
        while (b - a).abs() > self.eps {
            let c = a + (a - b) * f_a / (f_b - f_a);
            let f_c = f(c);
            if f_c * f_b <= 0. {
                a = b;
                f_a = f_b;
            } else {
                f_a *= 0.5;
            }
            b = c;
            f_b = f_c;
        }
        (0.5 * a).exp()
    }
}

impl RatingSystem for Glicko2 {
    type Rating = Glicko2Rating;

    fn create_rating(&self) -> Glicko2Rating {
        self.create_rating_with_mean(self.mu)
    }

    fn create_rating_with_mean(&self, mu: f64) -> Glicko2Rating {
        Glicko2Rating {
            rating: mu,
            deviation: self.phi,
            volatility: self.sigma,
        }
    }

    fn expect(&self, player: &Glicko2Rating, foe: &Glicko2Rating) -> f64 {
        let player = self.scale_down(player);
        let foe = self.scale_down(foe);
        let impact = Self::reduce_impact(foe.phi);
        standard_logistic_cdf(impact * (player.mu - foe.mu))
    }

    fn rate(&self, player: &Glicko2Rating, foe: &Glicko2Rating, result: f64) -> Glicko2Rating {
        let expected = self.expect(player, foe);
        let player = self.scale_down(player);
        let impact = Self::reduce_impact(self.scale_down(foe).phi);

        let variance = (impact * impact * expected * (1. - expected)).recip();
        let difference = variance * impact * (result - expected);

        let sigma = self.determine_sigma(&player, difference, variance);
        let phi_star = player.phi.hypot(sigma);
        let phi = (phi_star.powi(-2) + variance.recip()).sqrt().recip();
        let mu = player.mu + phi * phi * impact * (result - expected);

        self.scale_up(Scaled { mu, phi, sigma })
    }
}

impl Hyperparameters for Glicko2 {
    fn param_names(&self) -> &'static [&'static str] {
        &["mu", "phi", "sigma", "tau", "eps"]
    }

    fn get_param(&self, name: &str) -> Option<f64> {
        match name {
            "mu" => Some(self.mu),
            "phi" => Some(self.phi),
            "sigma" => Some(self.sigma),
            "tau" => Some(self.tau),
            "eps" => Some(self.eps),
            _ => None,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "mu" => self.mu = value,
            "phi" => self.phi = value,
            "sigma" => self.sigma = value,
            "tau" => self.tau = value,
            "eps" => self.eps = value,
            _ => return false,
        }
        true
    }
}
