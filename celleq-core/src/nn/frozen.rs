use crate::error::CellEqError;
use crate::nn::{Module, Parameter};

/// A read-only evaluation view over a model.
///
/// Metric procedures receive a `Frozen` instead of the model itself. The view
/// holds a shared borrow, so the model cannot be mutated while any
/// evaluation holds it, and only inference-side operations are exposed.
#[derive(Debug)]
pub struct Frozen<'m, M: Module + ?Sized> {
    module: &'m M,
}

impl<'m, M: Module + ?Sized> Frozen<'m, M> {
    pub fn new(module: &'m M) -> Self {
        Frozen { module }
    }

    /// Runs the wrapped module on a single input vector.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, CellEqError> {
        self.module.forward(input)
    }

    pub fn parameters(&self) -> Vec<&'m Parameter> {
        self.module.parameters()
    }

    /// Total trainable element count of the wrapped module.
    pub fn num_parameters(&self) -> usize {
        self.module.num_parameters()
    }
}

impl<'m, M: Module + ?Sized> Clone for Frozen<'m, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'m, M: Module + ?Sized> Copy for Frozen<'m, M> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::layers::Linear;

    #[test]
    fn test_frozen_forwards_and_counts() -> Result<(), CellEqError> {
        let weight = Parameter::new_unnamed(vec![1.0, 0.0, 0.0, 2.0], vec![2, 2])?;
        let bias = Parameter::new_unnamed(vec![0.5, -0.5], vec![2])?;
        let linear = Linear::from_parameters(weight, Some(bias))?;
        let frozen = Frozen::new(&linear);
        let copy = frozen;

        assert_eq!(frozen.forward(&[1.0, 1.0])?, vec![1.5, 1.5]);
        assert_eq!(copy.num_parameters(), 6);
        assert_eq!(copy.parameters().len(), 2);
        Ok(())
    }

    #[test]
    fn test_frozen_over_trait_object() {
        let linear = Linear::new(3, 2, true);
        let dyn_module: &dyn Module = &linear;
        let frozen = Frozen::new(dyn_module);
        assert_eq!(frozen.num_parameters(), 8);
    }
}
