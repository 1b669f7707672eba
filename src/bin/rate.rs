use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tennis_skill::data_processing::{MatchRecord, read_matches_csv};
use tennis_skill::experiment_config::parse_param;
use tennis_skill::models::{
    DoubleElo, DoubleGlicko2, DoubleModifiedGlicko, DoubleRatingModel, RankingModel,
    get_model_by_name,
};
use tennis_skill::summary::print_ratings;
use tennis_skill::systems::{Hyperparameters, RatingSystem};
use tennis_skill::{Error, Result};

#[derive(Parser)]
#[command(long_about = "Rates every player in a match log and prints the leaderboard")]
struct Args {
    /// Model name, e.g. double-elo or double-modified-glicko
    model: String,

    /// CSV match log, sorted by date
    matches: PathBuf,

    /// Parameter override, e.g. --param K=20
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,

    /// Where all_players.csv is written
    #[arg(short, long, default_value = "../data/output")]
    output_dir: PathBuf,
}

fn rate_double<S: RatingSystem + Hyperparameters>(
    mut model: DoubleRatingModel<S>,
    params: &BTreeMap<String, f64>,
    data: &[MatchRecord],
    dir: &Path,
) -> Result<()> {
    for (name, &value) in params {
        model.set_param(name, value)?;
    }
    let now = std::time::Instant::now();
    let error = model.train(data);
    tracing::info!(
        "{} {:?}\nFinished in {} seconds with log-loss {}.",
        model.name(),
        model.params(),
        now.elapsed().as_secs_f64(),
        error
    );
    print_ratings(&model, dir);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let data = read_matches_csv(&args.matches)?;
    let params: BTreeMap<String, f64> = args.params.into_iter().collect();
    let dir = &args.output_dir;
    std::fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;

    match args.model.as_str() {
        "double-elo" => rate_double(DoubleElo::double_elo(), &params, &data, dir),
        "double-elo-surface" => {
            rate_double(DoubleElo::double_elo_surface(), &params, &data, dir)
        }
        "double-modified-glicko" => rate_double(
            DoubleModifiedGlicko::double_modified_glicko(),
            &params,
            &data,
            dir,
        ),
        "double-glicko2" => rate_double(DoubleGlicko2::double_glicko2(), &params, &data, dir),
        name => {
            // Models without serve and return ratings have no leaderboard
            let mut model = get_model_by_name(name, &params)?;
            let error = model.train(&data);
            tracing::info!("{} {:?}: log-loss {}", name, model.params(), error);
            Ok(())
        }
    }
}

/// Rates a full match history with one model
fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}
