use clap::Parser;
use tennis_skill::tennis::{self, monte_carlo::MonteCarlo};

#[derive(Parser)]
#[command(long_about = "Compares the closed-form win probabilities against random playouts")]
struct Args {
    /// Probability that the first player wins a point on serve
    p: f64,

    /// Probability that the second player wins a point on serve
    q: f64,

    #[arg(long, default_value_t = 3)]
    best_of: u8,

    #[arg(long, default_value_t = 100_000)]
    trials: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt::init();
    let Args {
        p,
        q,
        best_of,
        trials,
        seed,
    } = Args::parse();
    let mut mc = MonteCarlo::new(trials, seed);

    let comparisons = [
        ("game", tennis::game_probability(p), mc.game_probability(p)),
        (
            "tiebreak",
            tennis::tiebreak_probability(p, q),
            mc.tiebreak_probability(p, q),
        ),
        (
            "set",
            tennis::set_probability(p, q),
            mc.set_probability(p, q),
        ),
        (
            "match",
            tennis::match_probability(p, q, best_of),
            mc.match_probability(p, q, best_of),
        ),
    ];
    for (stage, exact, simulated) in comparisons {
        tracing::info!(
            "{:>8}: exact {:.5}, simulated {:.5}, difference {:+.5}",
            stage,
            exact,
            simulated,
            simulated - exact
        );
    }
}
