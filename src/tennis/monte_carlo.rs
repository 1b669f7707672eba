//! Point-by-point random playout, used to validate the closed-form recursions.

use super::{GAME_POINTS, SET_GAMES, TIEBREAK_POINTS, sets_to_win};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct MonteCarlo {
    pub trials: usize,
    rng: StdRng,
}

impl MonteCarlo {
    pub fn new(trials: usize, seed: u64) -> Self {
        Self {
            trials,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn point(&mut self, prob: f64) -> bool {
        self.rng.random::<f64>() < prob
    }

    /// Plays one service game; returns whether the server won it.
    pub fn play_game(&mut self, p: f64) -> bool {
        let (mut a, mut b) = (0, 0);
        while (a < GAME_POINTS && b < GAME_POINTS) || a.abs_diff(b) < 2 {
            if self.point(p) {
                a += 1;
            } else {
                b += 1;
            }
        }
        a > b
    }

    /// Plays one tiebreak in which A serves first; returns whether A won it.
    pub fn play_tiebreak(&mut self, p: f64, q: f64) -> bool {
        let (mut a, mut b) = (0, 0);
        while (a < TIEBREAK_POINTS && b < TIEBREAK_POINTS) || a.abs_diff(b) < 2 {
            let a_serving = (a + b + 1) / 2 % 2 == 0;
            let a_wins = if a_serving {
                self.point(p)
            } else {
                !self.point(q)
            };
            if a_wins {
                a += 1;
            } else {
                b += 1;
            }
        }
        a > b
    }

    /// Plays one set in which A serves first; returns whether A won it.
    pub fn play_set(&mut self, p: f64, q: f64) -> bool {
        let (mut a, mut b) = (0, 0);
        loop {
            if a == SET_GAMES && b == SET_GAMES {
                return self.play_tiebreak(p, q);
            }
            if (a >= SET_GAMES || b >= SET_GAMES) && a.abs_diff(b) >= 2 {
                return a > b;
            }
            let a_wins = if (a + b) % 2 == 0 {
                self.play_game(p)
            } else {
                !self.play_game(q)
            };
            if a_wins {
                a += 1;
            } else {
                b += 1;
            }
        }
    }

    pub fn play_match(&mut self, p: f64, q: f64, best_of: u8) -> bool {
        let needed = sets_to_win(best_of);
        let (mut a, mut b) = (0, 0);
        while a < needed && b < needed {
            if self.play_set(p, q) {
                a += 1;
            } else {
                b += 1;
            }
        }
        a > b
    }

    fn estimate(&mut self, mut trial: impl FnMut(&mut Self) -> bool) -> f64 {
        let mut wins = 0;
        for _ in 0..self.trials {
            if trial(self) {
                wins += 1;
            }
        }
        wins as f64 / self.trials as f64
    }

    pub fn game_probability(&mut self, p: f64) -> f64 {
        self.estimate(|mc| mc.play_game(p))
    }

    pub fn tiebreak_probability(&mut self, p: f64, q: f64) -> f64 {
        self.estimate(|mc| mc.play_tiebreak(p, q))
    }

    pub fn set_probability(&mut self, p: f64, q: f64) -> f64 {
        self.estimate(|mc| mc.play_set(p, q))
    }

    pub fn match_probability(&mut self, p: f64, q: f64, best_of: u8) -> f64 {
        self.estimate(|mc| mc.play_match(p, q, best_of))
    }
}
