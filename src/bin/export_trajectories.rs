use clap::Parser;
use std::path::PathBuf;
use tennis_skill::data_processing::{MatchRecord, read_matches_csv, write_to_json};
use tennis_skill::experiment_config::parse_param;
use tennis_skill::models::{
    DoubleElo, DoubleGlicko2, DoubleModifiedGlicko, DoubleRatingModel, RankingModel,
};
use tennis_skill::summary::{TrajectoryExport, export_trajectories};
use tennis_skill::systems::{Hyperparameters, RatingSystem};
use tennis_skill::{Error, Result};

#[derive(Parser)]
#[command(long_about = "Exports the smoothed rating histories of the top players as JSON")]
struct Args {
    /// A double model: double-elo, double-elo-surface, double-modified-glicko or double-glicko2
    model: String,

    /// CSV match log, sorted by date
    matches: PathBuf,

    /// Output JSON file
    output: PathBuf,

    /// How many of the top players to follow
    #[arg(short, default_value_t = 20)]
    n: usize,

    /// Parameter override, e.g. --param start_sigma=60
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,
}

fn export<S: RatingSystem + Hyperparameters>(
    mut model: DoubleRatingModel<S>,
    args: &Args,
    data: &[MatchRecord],
) -> Result<TrajectoryExport> {
    for (name, value) in &args.params {
        model.set_param(name, *value)?;
    }
    Ok(export_trajectories(&mut model, data, args.n))
}

fn run(args: &Args) -> Result<()> {
    let data = read_matches_csv(&args.matches)?;
    let export = match args.model.as_str() {
        "double-elo" => export(DoubleElo::double_elo(), args, &data)?,
        "double-elo-surface" => export(DoubleElo::double_elo_surface(), args, &data)?,
        "double-modified-glicko" => {
            export(DoubleModifiedGlicko::double_modified_glicko(), args, &data)?
        }
        "double-glicko2" => export(DoubleGlicko2::double_glicko2(), args, &data)?,
        name => return Err(Error::UnknownModel(name.to_owned())),
    };
    tracing::info!(
        "Following {} players through {} tournaments",
        export.players.len(),
        export.tours.len()
    );
    write_to_json(&export, &args.output)
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}
