use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use tennis_skill::experiment_config::Experiment;
use tennis_skill::optimizer::NelderMead;

#[derive(Parser)]
#[command(long_about = "Fits the trainable parameters of each configured model by Nelder-Mead")]
struct Args {
    /// json5 experiment files; the model's parameters are the starting point
    #[arg(required = true)]
    experiments: Vec<PathBuf>,

    /// Iteration budget of each fit, by default 200 per parameter
    #[arg(long)]
    max_iter: Option<usize>,

    /// Convergence tolerance on the parameters and the log-loss
    #[arg(long, default_value_t = 1e-4)]
    tol: f64,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let optimizer = NelderMead {
        max_iter: args.max_iter,
        xatol: args.tol,
        fatol: args.tol,
        ..Default::default()
    };

    // Each experiment owns its model, so they can be fitted independently
    args.experiments.par_iter().for_each(|filename| {
        let mut experiment = match Experiment::from_file(filename) {
            Ok(experiment) => experiment,
            Err(err) => {
                tracing::error!("Skipping {:?}: {}", filename, err);
                return;
            }
        };
        let fit = match experiment.fit(&optimizer) {
            Ok(fit) => fit,
            Err(err) => {
                tracing::error!("Failed to fit {:?}: {}", filename, err);
                return;
            }
        };
        let results = experiment.eval();

        let horizontal = "============================================================";
        tracing::info!(
            "{:?} {}: {:?} -> {} after {} evaluations ({})\ntest accuracy {:.5}, ROI {:.5}\n{}",
            filename,
            results.model,
            experiment.model.trainable_names(),
            results.train_error,
            fit.nfev,
            fit.message,
            results.accuracy_mean,
            results.roi_mean,
            horizontal
        );
    });
}
