use celleq_core::CellEqError;

/// Represents a dataset that can be accessed by index.
///
/// A dataset is a finite collection of items. Access goes through `&self`,
/// so the same dataset can be traversed any number of times (the loaders
/// restart from the sampler on every traversal).
pub trait Dataset {
    /// The type of a single item returned by the dataset.
    type Item: Send + 'static;

    /// Returns the item at the given index.
    ///
    /// # Errors
    ///
    /// Returns `CellEqError::IndexOutOfBounds` if the index is out of bounds.
    fn get(&self, index: usize) -> Result<Self::Item, CellEqError>;

    /// Returns the total number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
