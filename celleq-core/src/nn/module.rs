use crate::error::CellEqError;
use crate::nn::Parameter;

/// The base trait for all model components (layers, containers, etc.).
///
/// A module maps a flat `f32` feature vector to an output vector and exposes
/// its learnable parameters. Every method takes `&self`: modules have no
/// mutating operations, so any borrowed model is safe to share across
/// evaluation runs.
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    ///
    /// # Errors
    /// Returns `CellEqError::ShapeMismatch` when `input` does not have the
    /// length the module expects.
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, CellEqError>;

    /// Returns all learnable parameters of the module, including those of
    /// sub-modules.
    fn parameters(&self) -> Vec<&Parameter>;

    /// Returns all learnable parameters along with hierarchical names
    /// (e.g. "0.weight", "0.bias").
    fn named_parameters(&self) -> Vec<(String, &Parameter)>;

    /// Returns the direct child modules.
    fn children(&self) -> Vec<&dyn Module> {
        Vec::new()
    }

    /// Returns the direct child modules along with their names.
    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        Vec::new()
    }

    /// Returns all modules in the tree (self + all descendants), depth-first.
    fn modules(&self) -> Vec<&dyn Module>;

    /// Total number of scalar elements across all parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }
}
