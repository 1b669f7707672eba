//! Closed-form probabilities of winning a game, tiebreak, set and match, given the
//! probability that each player wins a point on their own serve.
//!
//! Throughout, `p` is the probability that player A wins a point while serving and
//! `q` is the probability that player B wins a point while serving. Every function
//! returns the probability that A wins, and is deterministic in its arguments.

pub mod monte_carlo;

/// Points needed to win a game or a tiebreak, and games needed to win a set.
pub const GAME_POINTS: u32 = 4;
pub const TIEBREAK_POINTS: u32 = 7;
pub const SET_GAMES: u32 = 6;

/// Number of sets needed to win a best-of-`best_of` match.
pub fn sets_to_win(best_of: u8) -> u32 {
    (best_of as u32 + 1) / 2
}

/// Probability that the server wins a service game from 0-0.
pub fn game_probability(p: f64) -> f64 {
    game_probability_from(p, 0, 0)
}

/// Probability that the server wins a service game leading `a` points to `b`.
pub fn game_probability_from(p: f64, a: u32, b: u32) -> f64 {
    // Deuce: the server must win two points in a row before losing two
    let deuce = p * p / (p * p + (1. - p) * (1. - p));
    let settled = |a: u32, b: u32| race_outcome(GAME_POINTS, GAME_POINTS - 1, deuce, a, b);
    score_grid(GAME_POINTS - 1, a, b, &settled, &|_: u32| p)
}

// A serves the first point of the tiebreak, then the serve alternates every two points
fn a_serves_tiebreak_point(points_played: u32) -> bool {
    (points_played + 1) / 2 % 2 == 0
}

/// Probability that A wins a tiebreak in which A serves first.
pub fn tiebreak_probability(p: f64, q: f64) -> f64 {
    tiebreak_probability_from(p, q, 0, 0)
}

/// Probability that A wins a tiebreak from `a` points to `b`, where A served first.
pub fn tiebreak_probability_from(p: f64, q: f64, a: u32, b: u32) -> f64 {
    // From 6-6 each pair of points contains one serve by each player,
    // so A must win a pair outright before losing one
    let win_pair = p * (1. - q);
    let tied = win_pair / (win_pair + (1. - p) * q);
    let settled =
        |a: u32, b: u32| race_outcome(TIEBREAK_POINTS, TIEBREAK_POINTS - 1, tied, a, b);
    let point = |played: u32| {
        if a_serves_tiebreak_point(played) {
            p
        } else {
            1. - q
        }
    };
    score_grid(TIEBREAK_POINTS - 1, a, b, &settled, &point)
}

// Winner-by-two races to `target`, whose value at equal scores from `tie` on is `tied`
fn race_outcome(target: u32, tie: u32, tied: f64, a: u32, b: u32) -> Option<f64> {
    if a >= target && a >= b + 2 {
        Some(1.)
    } else if b >= target && b >= a + 2 {
        Some(0.)
    } else if a >= tie && a == b {
        Some(tied)
    } else {
        None
    }
}

/// Probability that A wins from `a` to `b`, where `settled` gives the value of
/// finished or closed-form scores and `point(n)` is the probability that A wins
/// the next unit after `n` have been played. Scores up to `last` each are
/// tabulated backwards, so every score past `last` must be settled.
fn score_grid<F, G>(last: u32, a: u32, b: u32, settled: &F, point: &G) -> f64
where
    F: Fn(u32, u32) -> Option<f64>,
    G: Fn(u32) -> f64,
{
    if let Some(value) = settled(a, b) {
        return value;
    }
    if a > last || b > last {
        let x = point(a + b);
        return x * score_grid(last, a + 1, b, settled, point)
            + (1. - x) * score_grid(last, a, b + 1, settled, point);
    }

    let width = last as usize + 1;
    let index = |a: u32, b: u32| a as usize * width + b as usize;
    let mut probs = vec![0.; width * width];
    for i in (a..=last).rev() {
        for j in (b..=last).rev() {
            let value = match settled(i, j) {
                Some(value) => value,
                None => {
                    let lookup = |a, b| settled(a, b).unwrap_or_else(|| probs[index(a, b)]);
                    let x = point(i + j);
                    x * lookup(i + 1, j) + (1. - x) * lookup(i, j + 1)
                }
            };
            probs[index(i, j)] = value;
        }
    }
    probs[index(a, b)]
}

/// Probability that A wins a set in which A serves the first game.
pub fn set_probability(p: f64, q: f64) -> f64 {
    set_probability_from(p, q, 0, 0)
}

/// Probability that A wins a set from `a` games to `b`, where A served first.
pub fn set_probability_from(p: f64, q: f64, a: u32, b: u32) -> f64 {
    let terminals = SetTerminals {
        hold: game_probability(p),
        break_serve: 1. - game_probability(q),
        tiebreak: tiebreak_probability(p, q),
    };
    terminals.from_score(a, b)
}

// Game and tiebreak probabilities are fixed for a whole set, so compute them once
struct SetTerminals {
    hold: f64,
    break_serve: f64,
    tiebreak: f64,
}

impl SetTerminals {
    fn settled(&self, a: u32, b: u32) -> Option<f64> {
        if a > SET_GAMES || (a == SET_GAMES && b + 2 <= a) {
            Some(1.)
        } else if b > SET_GAMES || (b == SET_GAMES && a + 2 <= b) {
            Some(0.)
        } else if a == SET_GAMES && b == SET_GAMES {
            Some(self.tiebreak)
        } else {
            None
        }
    }

    fn from_score(&self, a: u32, b: u32) -> f64 {
        let game = |played: u32| {
            if played % 2 == 0 {
                self.hold
            } else {
                self.break_serve
            }
        };
        score_grid(SET_GAMES, a, b, &|a: u32, b: u32| self.settled(a, b), &game)
    }
}

/// Probability that A wins a best-of-`best_of` match.
pub fn match_probability(p: f64, q: f64, best_of: u8) -> f64 {
    let set = set_probability(p, q);
    match_probability_from(set, sets_to_win(best_of), 0, 0)
}

/// Probability that A wins the match from `a` sets to `b`, given the probability
/// `set` of winning each set and the number of sets `needed` to win.
pub fn match_probability_from(set: f64, needed: u32, a: u32, b: u32) -> f64 {
    if a >= needed {
        1.
    } else if b >= needed {
        0.
    } else {
        set * match_probability_from(set, needed, a + 1, b)
            + (1. - set) * match_probability_from(set, needed, a, b + 1)
    }
}
