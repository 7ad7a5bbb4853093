//! Runs both metric families per dataset and assembles the report.

use crate::metrics::{evaluate_family, MetricFamily};
use crate::report::{ensure_renderable, Report, StampedRow};
use celleq_core::{CellEqError, Frozen, Module};
use celleq_data::BatchSource;
use log::{info, warn};
use std::fmt;

/// Default per-dataset batch cap.
pub const DEFAULT_MAX_BATCHES: usize = 400;

/// What happens when evaluating one dataset fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Abort the whole run; no report is produced.
    #[default]
    FailFast,
    /// Log the error, record it on the report and drop that dataset's row.
    SkipDataset,
}

/// A named loader to evaluate, with its own batch cap.
pub struct DatasetEntry<'a, I> {
    pub key: String,
    pub source: &'a dyn BatchSource<I>,
    pub max_batches: usize,
}

impl<'a, I> DatasetEntry<'a, I> {
    pub fn new(key: &str, source: &'a dyn BatchSource<I>, max_batches: usize) -> Self {
        DatasetEntry {
            key: key.to_string(),
            source,
            max_batches,
        }
    }
}

impl<I> fmt::Debug for DatasetEntry<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetEntry")
            .field("key", &self.key)
            .field("num_batches", &self.source.num_batches())
            .field("max_batches", &self.max_batches)
            .finish()
    }
}

/// Orchestrates a discrete and a continuous metric family over datasets.
pub struct MetricsPipeline<M: Module + ?Sized, I> {
    model_name: String,
    discrete: Box<dyn MetricFamily<M, I>>,
    continuous: Box<dyn MetricFamily<M, I>>,
    policy: FailurePolicy,
}

impl<M: Module + ?Sized, I> MetricsPipeline<M, I> {
    /// # Errors
    /// `SchemaCollision` when the two families declare a common column, or
    /// when a declared column clashes with a report column (`dataset`,
    /// `model`, `params` or another metric's `<name>_std`).
    pub fn new(
        model_name: &str,
        discrete: Box<dyn MetricFamily<M, I>>,
        continuous: Box<dyn MetricFamily<M, I>>,
    ) -> Result<Self, CellEqError> {
        let declared: Vec<String> = continuous
            .columns()
            .into_iter()
            .chain(discrete.columns())
            .collect();
        ensure_renderable(&declared)?;
        Ok(MetricsPipeline {
            model_name: model_name.to_string(),
            discrete,
            continuous,
            policy: FailurePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Evaluates one dataset: discrete family first, then continuous, merged
    /// with the continuous columns first and stamped with the metadata.
    pub fn get_metrics(
        &self,
        key: &str,
        source: &dyn BatchSource<I>,
        model: &Frozen<'_, M>,
        max_batches: usize,
    ) -> Result<StampedRow, CellEqError> {
        let discrete = evaluate_family(source, self.discrete.as_ref(), model, max_batches)?;
        let continuous = evaluate_family(source, self.continuous.as_ref(), model, max_batches)?;
        let metrics = continuous.merge(discrete)?;
        Ok(StampedRow {
            metrics,
            dataset: key.to_string(),
            model: self.model_name.clone(),
            params: model.num_parameters(),
        })
    }

    /// Evaluates every dataset in order against the same model and
    /// concatenates the rows.
    pub fn evaluate_all(
        &self,
        model: &Frozen<'_, M>,
        datasets: &[DatasetEntry<'_, I>],
    ) -> Result<Report, CellEqError> {
        let mut report = Report::new();
        for entry in datasets {
            info!(
                "dataset '{}': {} batches available, cap {}",
                entry.key,
                entry.source.num_batches(),
                entry.max_batches
            );
            match self.get_metrics(&entry.key, entry.source, model, entry.max_batches) {
                Ok(row) => report.push(row)?,
                Err(e) => match self.policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::SkipDataset => {
                        warn!("skipping dataset '{}': {}", entry.key, e);
                        report.record_failure(&entry.key, e);
                    }
                },
            }
        }
        Ok(report)
    }
}

impl<M: Module + ?Sized, I> fmt::Debug for MetricsPipeline<M, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsPipeline")
            .field("model_name", &self.model_name)
            .field("discrete", &self.discrete.name())
            .field("continuous", &self.continuous.name())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
