use clap::Parser;
use itertools::Itertools;
use std::path::PathBuf;
use tennis_skill::data_processing::write_to_json;
use tennis_skill::experiment_config::Experiment;
use tennis_skill::metrics::METRIC_NAMES;

#[derive(Parser)]
#[command(long_about = "Trains each configured model, then tests it year by year")]
struct Args {
    /// json5 experiment files
    #[arg(required = true)]
    experiments: Vec<PathBuf>,

    /// Also write each experiment's results as JSON into this directory
    #[arg(long)]
    json_dir: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    // To ensure accurate timings, this loop is not parallelized
    for filename in &args.experiments {
        let mut experiment = match Experiment::from_file(filename) {
            Ok(experiment) => experiment,
            Err(err) => {
                tracing::error!("Skipping {:?}: {}", filename, err);
                continue;
            }
        };
        let results = experiment.eval();

        let yearly = results
            .yearly
            .iter()
            .map(|y| format!("{}: {} (ROI {:.4})", y.year, y.report, y.roi))
            .join("\n");
        let horizontal = "============================================================";
        tracing::info!(
            "{:?} {} {:?}\ntrain {:?}: {}\n{}\ntest {}\naccuracy {:.5} +- {:.5}, 95% CI {:?}\nROI {:.5} +- {:.5}, 95% CI {:?}\n{}s\n{}",
            filename,
            results.model,
            results.params,
            METRIC_NAMES,
            results.train_report,
            yearly,
            results.test_report,
            results.accuracy_mean,
            results.accuracy_std,
            results.accuracy_ci,
            results.roi_mean,
            results.roi_std,
            results.roi_ci,
            results.secs_elapsed,
            horizontal
        );

        if let Some(dir) = &args.json_dir {
            let stem = filename.file_stem().unwrap_or_default();
            let path = dir.join(stem).with_extension("json");
            if let Err(err) = write_to_json(&results, &path) {
                tracing::error!("Failed write to {:?}: {}", path, err);
            }
        }
    }
}
