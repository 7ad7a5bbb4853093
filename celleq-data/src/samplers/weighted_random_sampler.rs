// celleq-data/src/samplers/weighted_random_sampler.rs

use super::traits::Sampler;
use celleq_core::CellEqError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

/// Draws `num_samples` indices with replacement, each index `i` with
/// probability `weights[i] / sum(weights)`.
///
/// Weights are not required to sum to one; only their ratios matter.
#[derive(Debug)]
pub struct WeightedRandomSampler {
    weights: Vec<f64>,
    num_samples: usize,
    // None for an empty weight vector: every traversal is then empty.
    distribution: Option<WeightedIndex<f64>>,
    rng: Mutex<StdRng>,
}

impl WeightedRandomSampler {
    /// Creates a new `WeightedRandomSampler`.
    ///
    /// # Errors
    ///
    /// Returns `CellEqError::InvalidWeights` when a weight is negative or not
    /// finite, or when all weights are zero.
    pub fn new(weights: Vec<f64>, num_samples: usize, seed: Option<u64>) -> Result<Self, CellEqError> {
        let distribution = if weights.is_empty() {
            None
        } else {
            if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
                return Err(CellEqError::InvalidWeights(format!("non-finite weight {}", bad)));
            }
            Some(
                WeightedIndex::new(&weights)
                    .map_err(|e| CellEqError::InvalidWeights(e.to_string()))?,
            )
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(WeightedRandomSampler {
            weights,
            num_samples,
            distribution,
            rng: Mutex::new(rng),
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Sampler for WeightedRandomSampler {
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        let distribution = match self.distribution {
            Some(ref d) if dataset_len > 0 => d,
            _ => return Box::new(std::iter::empty()),
        };
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            log::warn!("Mutex for WeightedRandomSampler rng was poisoned. Recovering.");
            poisoned.into_inner()
        });
        let indices: Vec<usize> = (0..self.num_samples)
            .map(|_| distribution.sample(&mut *rng))
            .collect();
        Box::new(indices.into_iter())
    }

    fn len(&self, _dataset_len: usize) -> usize {
        self.num_samples
    }

    /// One weight per dataset item is required.
    fn check(&self, dataset_len: usize) -> Result<(), CellEqError> {
        if self.weights.len() != dataset_len {
            return Err(CellEqError::InvalidWeights(format!(
                "{} weights for a dataset of {} items",
                self.weights.len(),
                dataset_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "weighted_random_sampler_test.rs"]
mod tests;
