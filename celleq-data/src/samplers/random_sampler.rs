// celleq-data/src/samplers/random_sampler.rs

use super::traits::Sampler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

/// Visits every index once per traversal in a random order.
///
/// The generator is owned by the sampler: successive traversals draw fresh
/// permutations, and a seeded sampler reproduces the same sequence of
/// permutations.
#[derive(Debug)]
pub struct RandomSampler {
    rng: Mutex<StdRng>,
}

impl RandomSampler {
    /// Uniform shuffle of the whole dataset, seeded from `seed` or from
    /// system entropy.
    pub fn shuffle(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RandomSampler { rng: Mutex::new(rng) }
    }
}

impl Sampler for RandomSampler {
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        if dataset_len == 0 {
            return Box::new(std::iter::empty());
        }
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            log::warn!("Mutex for RandomSampler rng was poisoned. Recovering.");
            poisoned.into_inner()
        });
        let mut indices: Vec<usize> = (0..dataset_len).collect();
        indices.shuffle(&mut *rng);
        Box::new(indices.into_iter())
    }

    fn len(&self, dataset_len: usize) -> usize {
        dataset_len
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;
