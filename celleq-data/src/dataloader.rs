// dataloader.rs
//! # DataLoader
//!
//! Batching over a [`Dataset`] driven by a [`Sampler`].
//!
//! A `DataLoader` is restartable: every call to [`DataLoader::iter`] asks the
//! sampler for a fresh index sequence, so the same loader can feed several
//! metric procedures one after another.
//!
//! ```rust
//! use celleq_data::dataloader::DataLoader;
//! use celleq_data::datasets::VecDataset;
//! use celleq_data::samplers::SequentialSampler;
//!
//! let dataset = VecDataset::new(vec![1, 2, 3, 4, 5, 6]);
//! let loader = DataLoader::new(dataset, 2, SequentialSampler::new());
//! for batch in loader.iter() {
//!     let batch = batch.expect("no error expected");
//!     assert_eq!(batch.len(), 2);
//! }
//! assert_eq!(loader.len(), 3);
//! ```

use crate::datasets::Dataset;
use crate::samplers::Sampler;
use celleq_core::CellEqError;

/// Generic loader for batching and sampling.
///
/// # Type Parameters
/// - `D`: the dataset, implementing [`Dataset`].
/// - `S`: the sampler, implementing [`Sampler`].
pub struct DataLoader<D: Dataset, S: Sampler> {
    pub dataset: D,
    pub batch_size: usize,
    pub sampler: S,
}

impl<D: Dataset, S: Sampler> DataLoader<D, S> {
    pub fn new(dataset: D, batch_size: usize, sampler: S) -> Self {
        Self {
            dataset,
            batch_size,
            sampler,
        }
    }

    /// Starts a new traversal.
    ///
    /// When the sampler does not fit the dataset, the traversal yields that
    /// error once and ends.
    pub fn iter(&self) -> Batches<'_, D, S> {
        let len = self.dataset.len();
        match self.sampler.check(len) {
            Ok(()) => Batches {
                loader: self,
                indices: self.sampler.iter(len),
                pending: None,
            },
            Err(e) => Batches {
                loader: self,
                indices: Box::new(std::iter::empty()),
                pending: Some(e),
            },
        }
    }

    /// Number of batches one traversal yields.
    pub fn len(&self) -> usize {
        if self.batch_size == 0 {
            return 0;
        }
        self.sampler.len(self.dataset.len()).div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D: Dataset, S: Sampler> std::fmt::Debug for DataLoader<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("dataset_len", &self.dataset.len())
            .field("batch_size", &self.batch_size)
            .field("sampler", &self.sampler)
            .finish()
    }
}

/// One traversal over a [`DataLoader`].
pub struct Batches<'a, D: Dataset, S: Sampler> {
    loader: &'a DataLoader<D, S>,
    indices: Box<dyn Iterator<Item = usize> + Send + Sync>,
    pending: Option<CellEqError>,
}

impl<'a, D: Dataset, S: Sampler> Iterator for Batches<'a, D, S> {
    type Item = Result<Vec<<D as Dataset>::Item>, CellEqError>;

    /// Returns the next batch.
    ///
    /// - `Some(Ok(batch))`: a batch ready for use.
    /// - `Some(Err(e))`: an item could not be fetched, or the sampler does
    ///   not fit the dataset.
    /// - `None`: the traversal is over.
    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending.take() {
            return Some(Err(e));
        }
        let loader = self.loader;
        let mut batch = Vec::with_capacity(loader.batch_size);
        for _ in 0..loader.batch_size {
            match self.indices.next() {
                Some(idx) => match loader.dataset.get(idx) {
                    Ok(item) => batch.push(item),
                    Err(e) => return Some(Err(e)),
                },
                None => break,
            }
        }
        if batch.is_empty() {
            return None;
        }
        Some(Ok(batch))
    }
}

impl<'a, D: Dataset, S: Sampler> IntoIterator for &'a DataLoader<D, S> {
    type Item = Result<Vec<<D as Dataset>::Item>, CellEqError>;
    type IntoIter = Batches<'a, D, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Object-safe view of a restartable batch source.
///
/// Metric runs take `&dyn BatchSource<I>` so that loaders with different
/// dataset or sampler types can be evaluated through the same pipeline.
pub trait BatchSource<I> {
    /// Starts a new traversal.
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Vec<I>, CellEqError>> + '_>;

    /// Number of batches one traversal yields.
    fn num_batches(&self) -> usize;
}

impl<D: Dataset, S: Sampler> BatchSource<D::Item> for DataLoader<D, S> {
    fn batches(&self) -> Box<dyn Iterator<Item = Result<Vec<D::Item>, CellEqError>> + '_> {
        Box::new(self.iter())
    }

    fn num_batches(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
#[path = "dataloader_test.rs"]
mod tests;
