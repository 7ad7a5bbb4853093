//! End-to-end experiment: crops, balanced loaders, model, metrics, report.

use crate::config::ExperimentConfig;
use crate::crops::{CropSource, ManifestCropSource};
use crate::metrics::{ShiftEquivariance, TranslationLieDerivative};
use crate::pipeline::{DatasetEntry, FailurePolicy, MetricsPipeline, DEFAULT_MAX_BATCHES};
use crate::report::Report;
use celleq_core::{CellEqError, Frozen, Module, Sequential};
use celleq_data::datasets::retain_labeled;
use celleq_data::{
    stratified_subsample, training_sampler, Crop, CropDataset, CropTransform, DataLoader, Population, Sampler,
    SequentialSampler,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

/// Width of the hidden layer of the reference classifier.
pub const HIDDEN_FEATURES: usize = 64;

/// Process parameters of one experiment run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentArgs {
    pub output_dir: PathBuf,
    pub modelname: String,
    /// Batch cap for the additional `train_eval` dataset.
    pub num_datapoints: usize,
    /// Directory holding `config.json`.
    pub base_path: PathBuf,
    pub seed: Option<u64>,
    /// Batch cap for the `train` and `val` datasets.
    pub max_batches: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for ExperimentArgs {
    fn default() -> Self {
        ExperimentArgs {
            output_dir: PathBuf::from("equivariance_metrics_cnns"),
            modelname: "resnet18".to_string(),
            num_datapoints: 60,
            base_path: PathBuf::from("."),
            seed: None,
            max_batches: DEFAULT_MAX_BATCHES,
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

/// The three loaders of an experiment.
#[derive(Debug)]
pub struct Loaders {
    /// Training transform, balanced or shuffled sampling.
    pub train: DataLoader<CropDataset, Box<dyn Sampler>>,
    /// Training population with the evaluation transform, in order.
    pub train_eval: DataLoader<CropDataset, SequentialSampler>,
    pub val: DataLoader<CropDataset, SequentialSampler>,
}

fn sub_seed(seed: Option<u64>, stream: u64) -> Option<u64> {
    seed.map(|s| s.wrapping_add(stream))
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Drops unlabeled crops and, when `size_data` is set, caps every class.
pub fn prepare_populations(
    config: &ExperimentConfig,
    train: Population<Crop>,
    val: Population<Crop>,
    seed: Option<u64>,
) -> (Population<Crop>, Population<Crop>) {
    let train = retain_labeled(train);
    let val = retain_labeled(val);
    match config.size_data {
        Some(size) => {
            let mut rng = rng_from(seed);
            let train = stratified_subsample(train, size, &mut rng).items;
            let val = stratified_subsample(val, size, &mut rng).items;
            (train, val)
        }
        None => (train, val),
    }
}

/// Builds the balanced training loader and the two evaluation loaders.
pub fn build_loaders(
    config: &ExperimentConfig,
    train: Population<Crop>,
    val: Population<Crop>,
    seed: Option<u64>,
) -> Result<Loaders, CellEqError> {
    let sampler = training_sampler(
        &train,
        config.hierarchy_match.as_ref(),
        config.sample_batch,
        sub_seed(seed, 1),
    )?;
    let size = config.crop_input_size;
    let train_dataset = CropDataset::new(
        train.clone(),
        CropTransform::for_training(size, config.aug),
        sub_seed(seed, 2),
    );
    let train_eval_dataset = CropDataset::new(train, CropTransform::eval(size), None);
    let val_dataset = CropDataset::new(val, CropTransform::eval(size), None);

    let loaders = Loaders {
        train: DataLoader::new(train_dataset, config.batch_size, sampler),
        train_eval: DataLoader::new(train_eval_dataset, config.batch_size, SequentialSampler::new()),
        val: DataLoader::new(val_dataset, config.batch_size, SequentialSampler::new()),
    };
    info!(
        "loaders: train {} batches, val {} batches (num_workers {} ignored)",
        loaders.train.len(),
        loaders.val.len(),
        config.num_workers
    );
    Ok(loaders)
}

/// The reference classifier over flattened crops.
pub fn build_model(config: &ExperimentConfig, num_channels: usize, seed: Option<u64>) -> Result<Sequential, CellEqError> {
    let mut rng = rng_from(seed);
    let model = Sequential::classifier(
        num_channels * config.crop_input_size,
        HIDDEN_FEATURES,
        config.num_classes,
        &mut rng,
    )?;
    info!("model: {} input channels, {} parameters", num_channels, model.num_parameters());
    Ok(model)
}

/// Evaluates `model` on the train, val and train_eval loaders with the
/// reference metric families.
pub fn evaluate_loaders<M: Module + ?Sized>(
    args: &ExperimentArgs,
    loaders: &Loaders,
    model: &M,
) -> Result<Report, CellEqError> {
    let pipeline: MetricsPipeline<M, Crop> = MetricsPipeline::new(
        &args.modelname,
        Box::new(ShiftEquivariance::default()),
        Box::new(TranslationLieDerivative::default()),
    )?
    .with_policy(args.failure_policy);
    let datasets: [DatasetEntry<'_, Crop>; 3] = [
        DatasetEntry::new("train", &loaders.train, args.max_batches),
        DatasetEntry::new("val", &loaders.val, args.max_batches),
        DatasetEntry::new("train_eval", &loaders.train_eval, args.num_datapoints),
    ];
    pipeline.evaluate_all(&Frozen::new(model), &datasets)
}

/// Runs an experiment with crops from `source` and returns the report
/// without writing it.
pub fn run_with_source(
    args: &ExperimentArgs,
    config: &ExperimentConfig,
    source: &dyn CropSource,
) -> Result<Report, CellEqError> {
    let (train, val) = source.load()?;
    let (train, val) = prepare_populations(config, train, val, args.seed);
    let loaders = build_loaders(config, train, val, args.seed)?;
    let model = build_model(config, config.num_channels()?, sub_seed(args.seed, 3))?;
    evaluate_loaders(args, &loaders, &model)
}

/// Loads the configuration under `args.base_path`, runs the experiment on
/// the manifest crops and writes `<output_dir>/<modelname>.csv`.
///
/// Nothing is written when any step fails.
pub fn run_experiment(args: &ExperimentArgs) -> Result<PathBuf, CellEqError> {
    let config = ExperimentConfig::load(&args.base_path)?;
    let source = ManifestCropSource::from_config(&config);
    let report = run_with_source(args, &config, &source)?;
    fs::create_dir_all(&args.output_dir).map_err(|e| CellEqError::io(&args.output_dir, e))?;
    report.save(&args.output_dir, &args.modelname)
}
