use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tennis_skill::data_processing::MatchRecord;
use tennis_skill::tennis;

pub const PLAYERS: [&str; 8] = [
    "Novak Djokovic",
    "Rafael Nadal",
    "Roger Federer",
    "Andy Murray",
    "Stan Wawrinka",
    "David Ferrer",
    "Kei Nishikori",
    "Tomas Berdych",
];
const SURFACES: [&str; 3] = ["Hard", "Clay", "Grass"];

/// A reproducible match log between players of fixed serve and return skill, one
/// match per day starting in 2010. Every 13th match lacks serve statistics.
pub fn synthetic_matches(len: usize, seed: u64) -> Vec<MatchRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    // Share of service points won, and share of return points won, on average
    let serve: Vec<f64> = (0..PLAYERS.len()).map(|i| 0.70 - 0.015 * i as f64).collect();
    let ret: Vec<f64> = (0..PLAYERS.len()).map(|i| 0.38 - 0.015 * i as f64).collect();
    let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();

    (0..len)
        .map(|i| {
            let a = rng.random_range(0..PLAYERS.len());
            let b = (a + rng.random_range(1..PLAYERS.len())) % PLAYERS.len();
            let p = serve[a] - ret[b] + 0.33;
            let q = serve[b] - ret[a] + 0.33;
            let best_of = if i % 4 == 0 { 5 } else { 3 };
            let a_win_prob = tennis::match_probability(p, q, best_of);

            let noise = |rng: &mut StdRng| 0.05 * (rng.random::<f64>() - 0.5);
            let (wsp_a, wsp_b) = (p + noise(&mut rng), q + noise(&mut rng));
            let (winner, loser, wsp1, wsp2, winner_prob) = if rng.random::<f64>() < a_win_prob {
                (a, b, wsp_a, wsp_b, a_win_prob)
            } else {
                (b, a, wsp_b, wsp_a, 1. - a_win_prob)
            };

            let date = start + Days::new(i as u64);
            let serve_pcts = (i % 13 != 12).then_some((wsp1, wsp2));
            let mut record = MatchRecord::new(PLAYERS[winner], PLAYERS[loser], serve_pcts, date);
            record.best_of = best_of;
            record.tournament = format!("Tournament {}", i / 10);
            record.surface = SURFACES[(i / 10) % SURFACES.len()].to_owned();
            record.round = "R16".to_owned();
            record.score = "6-3 6-4".to_owned();
            // A bookmaker that knows the true odds and keeps a 5% margin
            record.winner_odds = Some(0.95 / winner_prob);
            record.loser_odds = Some(0.95 / (1. - winner_prob));
            record
        })
        .collect()
}

pub fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("tennis_skill_{}_{}", std::process::id(), name))
}
