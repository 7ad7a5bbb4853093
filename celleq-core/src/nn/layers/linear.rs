use crate::error::CellEqError;
use crate::nn::init::uniform_fan_in;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use rand::Rng;

/// Applies a linear transformation to the incoming data: y = xA^T + b
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Parameter,
    bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a new zero-initialised Linear layer.
    ///
    /// # Arguments
    ///
    /// * `in_features` - Size of each input sample.
    /// * `out_features` - Size of each output sample.
    /// * `has_bias` - If `true`, the layer has an additive bias.
    pub fn new(in_features: usize, out_features: usize, has_bias: bool) -> Self {
        // Weight shape: [out_features, in_features]
        let mut weight = Parameter::zeros(vec![out_features, in_features]);
        weight.set_name("weight");
        let bias = has_bias.then(|| {
            let mut bias = Parameter::zeros(vec![out_features]);
            bias.set_name("bias");
            bias
        });
        Linear {
            weight,
            bias,
            in_features,
            out_features,
        }
    }

    /// Creates a Linear layer with weights and bias drawn from
    /// U(-1/sqrt(in_features), 1/sqrt(in_features)).
    pub fn with_init<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        has_bias: bool,
        rng: &mut R,
    ) -> Result<Self, CellEqError> {
        let weight = Parameter::new(
            uniform_fan_in(out_features * in_features, in_features, 1.0, rng),
            vec![out_features, in_features],
            Some("weight".to_string()),
        )?;
        let bias = if has_bias {
            Some(Parameter::new(
                uniform_fan_in(out_features, in_features, 1.0, rng),
                vec![out_features],
                Some("bias".to_string()),
            )?)
        } else {
            None
        };
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    /// Builds a Linear layer from existing parameters.
    ///
    /// # Errors
    /// `ShapeMismatch` if the weight is not 2-D or the bias length differs
    /// from the weight's output dimension.
    pub fn from_parameters(weight: Parameter, bias: Option<Parameter>) -> Result<Self, CellEqError> {
        let (out_features, in_features) = match weight.shape() {
            [out, inp] => (*out, *inp),
            other => {
                return Err(CellEqError::ShapeMismatch {
                    expected: vec![0, 0],
                    actual: other.to_vec(),
                    operation: "Linear::from_parameters (weight)".to_string(),
                })
            }
        };
        if let Some(ref b) = bias {
            if b.shape() != [out_features] {
                return Err(CellEqError::ShapeMismatch {
                    expected: vec![out_features],
                    actual: b.shape().to_vec(),
                    operation: "Linear::from_parameters (bias)".to_string(),
                });
            }
        }
        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &[f32]) -> Result<Vec<f32>, CellEqError> {
        if input.len() != self.in_features {
            return Err(CellEqError::ShapeMismatch {
                expected: vec![self.in_features],
                actual: vec![input.len()],
                operation: "Linear::forward".to_string(),
            });
        }
        let weights = self.weight.data();
        let output = (0..self.out_features)
            .map(|o| {
                let row = &weights[o * self.in_features..(o + 1) * self.in_features];
                let dot: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                match self.bias {
                    Some(ref b) => dot + b.data()[o],
                    None => dot,
                }
            })
            .collect();
        Ok(output)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        if let Some(ref b) = self.bias {
            params.push(b);
        }
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut params = vec![("weight".to_string(), &self.weight)];
        if let Some(ref b) = self.bias {
            params.push(("bias".to_string(), b));
        }
        params
    }

    fn modules(&self) -> Vec<&dyn Module> {
        vec![self]
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
