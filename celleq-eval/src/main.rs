use anyhow::Context;
use celleq_eval::{run_experiment, ExperimentArgs, FailurePolicy, DEFAULT_MAX_BATCHES};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Abort on the first failing dataset.
    FailFast,
    /// Drop the failing dataset's row and continue.
    Skip,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FailFast => FailurePolicy::FailFast,
            PolicyArg::Skip => FailurePolicy::SkipDataset,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "celleq-metrics",
    about = "Evaluate equivariance metrics of a crop classifier on balanced train/val loaders"
)]
struct Args {
    /// Directory the CSV report is written to.
    #[arg(long = "output_dir", default_value = "equivariance_metrics_cnns")]
    output_dir: PathBuf,
    /// Model identifier; also names the report file.
    #[arg(long, default_value = "resnet18")]
    modelname: String,
    /// Batch cap for the train_eval dataset.
    #[arg(long = "num_datapoints", default_value_t = 60)]
    num_datapoints: usize,
    /// Directory containing config.json.
    #[arg(long = "base_path")]
    base_path: PathBuf,
    /// Seed for subsampling, sampling, augmentation and model initialisation.
    #[arg(long)]
    seed: Option<u64>,
    /// Batch cap for the train and val datasets.
    #[arg(long = "max_batches", default_value_t = DEFAULT_MAX_BATCHES)]
    max_batches: usize,
    #[arg(long = "failure_policy", value_enum, default_value_t = PolicyArg::FailFast)]
    failure_policy: PolicyArg,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::debug!("{:?}", args);

    let experiment = ExperimentArgs {
        output_dir: args.output_dir,
        modelname: args.modelname,
        num_datapoints: args.num_datapoints,
        base_path: args.base_path,
        seed: args.seed,
        max_batches: args.max_batches,
        failure_policy: args.failure_policy.into(),
    };
    let path = run_experiment(&experiment).context("equivariance metrics run failed")?;
    println!("{}", path.display());
    Ok(())
}
