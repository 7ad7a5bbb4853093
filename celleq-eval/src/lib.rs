//! Equivariance metric reports over balanced crop loaders.
//!
//! A run loads the experiment configuration and crop populations, builds a
//! balanced training loader plus two evaluation loaders, evaluates a
//! discrete and a continuous metric family on each of them and writes one
//! CSV row per dataset.

pub mod config;
pub mod crops;
pub mod experiment;
pub mod metrics;
pub mod pipeline;
pub mod report;

pub use config::ExperimentConfig;
pub use crops::{CropSource, ManifestCropSource};
pub use experiment::{run_experiment, run_with_source, ExperimentArgs};
pub use metrics::{evaluate_family, FamilyKind, FnFamily, MetricFamily, MetricRow, MetricStat};
pub use pipeline::{DatasetEntry, FailurePolicy, MetricsPipeline, DEFAULT_MAX_BATCHES};
pub use report::{Report, StampedRow};
