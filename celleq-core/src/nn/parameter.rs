use crate::error::CellEqError;
use std::fmt;

/// A learnable parameter of a `Module`: a flat `f32` buffer with a shape.
///
/// Parameters are read through shared references only during evaluation;
/// the buffer is never handed out mutably by the `Module` trait.
#[derive(Clone, PartialEq)]
pub struct Parameter {
    name: Option<String>,
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Parameter {
    /// Creates a new Parameter.
    ///
    /// # Errors
    /// Returns `CellEqError::ShapeMismatch` if `data.len()` differs from the
    /// product of `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>, name: Option<String>) -> Result<Self, CellEqError> {
        let numel: usize = shape.iter().product();
        if numel != data.len() {
            return Err(CellEqError::ShapeMismatch {
                expected: shape,
                actual: vec![data.len()],
                operation: "Parameter::new".to_string(),
            });
        }
        Ok(Parameter { name, shape, data })
    }

    /// Creates a new Parameter without a name.
    pub fn new_unnamed(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, CellEqError> {
        Self::new(data, shape, None)
    }

    /// Creates a zero-filled Parameter of the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let numel = shape.iter().product();
        Parameter {
            name: None,
            shape,
            data: vec![0.0; numel],
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of scalar elements held by this parameter.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter(name={:?}, shape={:?})",
            self.name, self.shape
        )
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
