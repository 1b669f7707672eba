use crate::data_processing::{MatchRecord, write_slice_to_file};
use crate::models::{Competitor, DoubleRatingModel, RankingModel, Registry};
use crate::numerical::smooth_exponential;
use crate::systems::{Hyperparameters, RatingSystem, SkillEstimate};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Smoothing factor applied to exported rating trajectories.
pub const TRAJECTORY_ALPHA: f64 = 0.05;

pub struct GlobalSummary {
    mean_serve: f64,
    mean_return: f64,
    num_players: usize,
}

#[derive(Serialize, Deserialize)]
pub struct PlayerSummary {
    rank: usize,
    pub name: String,
    pub serve: f64,
    #[serde(rename = "return")]
    pub ret: f64,
    pub uncertainty: f64,
    pub games: usize,
}

fn summarize<R: SkillEstimate>(name: &str, player: &Competitor<R>) -> PlayerSummary {
    PlayerSummary {
        rank: 0,
        name: name.to_owned(),
        serve: player.serve.strength(),
        ret: player.ret.strength(),
        uncertainty: 0.5 * (player.serve.uncertainty() + player.ret.uncertainty()),
        games: player.games,
    }
}

pub fn make_leaderboard<S: RatingSystem + Hyperparameters>(
    model: &DoubleRatingModel<S>,
) -> (GlobalSummary, Vec<PlayerSummary>) {
    let mut rating_data: Vec<PlayerSummary> = model
        .competitors()
        .iter()
        .map(|(name, player)| summarize(name, player))
        .sorted_by(|a, b| {
            (b.serve + b.ret)
                .total_cmp(&(a.serve + a.ret))
                .then_with(|| a.name.cmp(&b.name))
        })
        .collect();
    for (rank, data) in rating_data.iter_mut().enumerate() {
        data.rank = rank + 1;
    }

    let num_players = rating_data.len();
    let global_summary = GlobalSummary {
        mean_serve: rating_data.iter().map(|p| p.serve).sum::<f64>() / num_players as f64,
        mean_return: rating_data.iter().map(|p| p.ret).sum::<f64>() / num_players as f64,
        num_players,
    };

    (global_summary, rating_data)
}

pub fn print_ratings<S: RatingSystem + Hyperparameters>(
    model: &DoubleRatingModel<S>,
    dir: impl AsRef<std::path::Path>,
) {
    let (summary, rating_data) = make_leaderboard(model);

    tracing::info!(
        "{} players, mean serve = {}, mean return = {}",
        summary.num_players,
        summary.mean_serve,
        summary.mean_return
    );
    for data in rating_data.iter().take(20) {
        tracing::info!(
            "{:>22} {:8.1} {:8.1} {:6}",
            data.name,
            data.serve,
            data.ret,
            data.games
        );
    }

    let filename = dir.as_ref().join("all_players.csv");
    write_slice_to_file(&rating_data, &filename);
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RatingPoint {
    pub serve: f64,
    #[serde(rename = "return")]
    pub ret: f64,
}

#[derive(Debug, Serialize)]
pub struct PlayerTrajectory {
    pub name: String,
    pub rating: Vec<RatingPoint>,
}

/// A checkpoint on the time axis, with the matches played under it.
#[derive(Debug, Serialize)]
pub struct Tour {
    pub text: String,
    pub value: usize,
    pub games: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TrajectoryExport {
    pub players: Vec<PlayerTrajectory>,
    pub n_points: usize,
    pub tours: Vec<Tour>,
}

fn truncated_point<R: SkillEstimate>(player: &Competitor<R>) -> RatingPoint {
    RatingPoint {
        serve: player.serve.strength().trunc(),
        ret: player.ret.strength().trunc(),
    }
}

/// Trains `model` on `data` to find its top `n` players, then replays `data` from
/// scratch and records the serve and return ratings of all of them each time one
/// of them enters a new tournament. Matches without serve statistics are skipped.
pub fn export_trajectories<S: RatingSystem + Hyperparameters>(
    model: &mut DoubleRatingModel<S>,
    data: &[MatchRecord],
    n: usize,
) -> TrajectoryExport {
    model.train(data);
    let top_n: Vec<String> = model
        .top_n(n)
        .into_iter()
        .map(|(name, _)| name.to_owned())
        .collect();

    let start = truncated_point(&model.new_competitor());
    let mut trajectories: Vec<PlayerTrajectory> = top_n
        .iter()
        .map(|name| PlayerTrajectory {
            name: name.clone(),
            rating: vec![start],
        })
        .collect();

    let mut replay = Registry::default();
    let mut last_tournament: Option<&str> = None;
    let mut tours: Vec<Tour> = vec![];
    for record in data {
        if record.serve_pcts().is_none() {
            continue;
        }
        let mut winner = replay.checkout(&record.winner, || model.new_competitor());
        let mut loser = replay.checkout(&record.loser, || model.new_competitor());
        model.transition(&mut winner, &mut loser, record);
        replay.checkin(winner);
        replay.checkin(loser);

        let involves_top = top_n.contains(&record.winner) || top_n.contains(&record.loser);
        if involves_top && last_tournament != Some(record.tournament.as_str()) {
            last_tournament = Some(&record.tournament);
            tours.push(Tour {
                text: format!("{} {}", record.tournament, record.date),
                value: tours.len() + 1,
                games: vec![],
            });
            for trajectory in &mut trajectories {
                let point = replay
                    .get(&trajectory.name)
                    .map_or(start, truncated_point);
                trajectory.rating.push(point);
            }
        }

        if last_tournament == Some(record.tournament.as_str()) {
            if let Some(tour) = tours.last_mut() {
                tour.games.push(format!(
                    "{} | {} vs {}: {}.",
                    record.round, record.winner, record.loser, record.score
                ));
            }
        }
    }

    for trajectory in &mut trajectories {
        let serve: Vec<f64> = trajectory.rating.iter().map(|p| p.serve).collect();
        let ret: Vec<f64> = trajectory.rating.iter().map(|p| p.ret).collect();
        trajectory.rating = smooth_exponential(&serve, TRAJECTORY_ALPHA)
            .into_iter()
            .zip(smooth_exponential(&ret, TRAJECTORY_ALPHA))
            .map(|(serve, ret)| RatingPoint { serve, ret })
            .collect();
    }
    trajectories.sort_by(|a, b| a.name.cmp(&b.name));

    TrajectoryExport {
        players: trajectories,
        n_points: tours.len() + 1,
        tours,
    }
}
