use crate::error::CellEqError;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;

/// Layer that applies the Rectified Linear Unit (ReLU) activation function.
///
/// This layer does not have any learnable parameters.
#[derive(Debug, Default, Clone)]
pub struct ReLU {}

impl ReLU {
    /// Creates a new ReLU layer.
    pub fn new() -> Self {
        ReLU {}
    }
}

impl Module for ReLU {
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, CellEqError> {
        Ok(input.iter().map(|&x| x.max(0.0)).collect())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new() // ReLU has no parameters
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        Vec::new()
    }

    fn modules(&self) -> Vec<&dyn Module> {
        vec![self]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_forward() -> Result<(), CellEqError> {
        let relu = ReLU::new();
        assert_eq!(relu.forward(&[-1.0, 0.0, 2.5, -0.1])?, vec![0.0, 0.0, 2.5, 0.0]);
        assert_eq!(relu.num_parameters(), 0);
        Ok(())
    }
}
