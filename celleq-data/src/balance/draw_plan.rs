use super::weights::{category_weights, CategoryMap};
use crate::datasets::population::LabeledItem;
use crate::samplers::{RandomSampler, Sampler, WeightedRandomSampler};
use celleq_core::CellEqError;

/// Per-item draw weights plus the number of draws per traversal.
///
/// One traversal draws `num_draws == weights.len()` indices with replacement,
/// with probability proportional to weight.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDrawPlan {
    weights: Vec<f64>,
    num_draws: usize,
}

impl WeightedDrawPlan {
    pub fn from_weights(weights: Vec<f64>) -> Self {
        let num_draws = weights.len();
        WeightedDrawPlan { weights, num_draws }
    }

    /// Builds a category-balanced plan for `items`.
    pub fn balanced<T: LabeledItem>(items: &[T], map: Option<&CategoryMap>) -> Result<Self, CellEqError> {
        let weights = category_weights(items, map)?;
        Ok(Self::from_weights(weights.weights))
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn num_draws(&self) -> usize {
        self.num_draws
    }

    pub fn into_sampler(self, seed: Option<u64>) -> Result<WeightedRandomSampler, CellEqError> {
        WeightedRandomSampler::new(self.weights, self.num_draws, seed)
    }
}

/// Sampler for the training loader.
///
/// The balanced plan is always built (so category errors surface regardless
/// of the switch); it drives the sampler when `sample_batch` is set,
/// otherwise the loader shuffles uniformly.
pub fn training_sampler<T: LabeledItem>(
    items: &[T],
    map: Option<&CategoryMap>,
    sample_batch: bool,
    seed: Option<u64>,
) -> Result<Box<dyn Sampler>, CellEqError> {
    let plan = WeightedDrawPlan::balanced(items, map)?;
    if sample_batch {
        log::info!("training sampler: weighted, {} draws per epoch", plan.num_draws());
        Ok(Box::new(plan.into_sampler(seed)?))
    } else {
        log::info!("training sampler: uniform shuffle");
        Ok(Box::new(RandomSampler::shuffle(seed)))
    }
}
