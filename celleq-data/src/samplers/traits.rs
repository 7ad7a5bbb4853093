// celleq-data/src/samplers/traits.rs

use celleq_core::CellEqError;
use std::fmt::Debug;

/// A Sampler trait that defines how to iterate over indices of a dataset.
///
/// Samplers are used by `DataLoader` to generate a fresh sequence of indices
/// on every traversal.
pub trait Sampler: Debug + Send + Sync {
    /// Returns an iterator over the indices of a dataset.
    ///
    /// # Arguments
    ///
    /// * `dataset_len` - The total number of items in the dataset.
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync>;

    /// Returns the total number of samples that will be yielded by the iterator.
    ///
    /// This might be different from `dataset_len` for samplers that draw a
    /// fixed number of samples or sample with replacement.
    fn len(&self, dataset_len: usize) -> usize;

    /// Checks that the sampler can traverse a dataset of `dataset_len` items.
    fn check(&self, _dataset_len: usize) -> Result<(), CellEqError> {
        Ok(())
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn iter(&self, dataset_len: usize) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        (**self).iter(dataset_len)
    }

    fn len(&self, dataset_len: usize) -> usize {
        (**self).len(dataset_len)
    }

    fn check(&self, dataset_len: usize) -> Result<(), CellEqError> {
        (**self).check(dataset_len)
    }
}
