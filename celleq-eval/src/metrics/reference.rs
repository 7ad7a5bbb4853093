//! Built-in equivariance metrics over crops.
//!
//! Both families measure how a classifier's logits respond to a horizontal
//! translation of the input crop. They are deliberately small; any other
//! evaluator can be plugged into the pipeline through [`MetricFamily`].

use super::family::{FamilyKind, MetricFamily};
use celleq_core::{CellEqError, Frozen, Module};
use celleq_data::transforms::shift_row;
use celleq_data::Crop;

const NORM_EPS: f64 = 1e-12;

/// Discrete family: compares logits on a crop and on the same crop shifted
/// cyclically by `shift` pixels.
///
/// Columns: `shift_err` (relative L2 change of the logits) and `shift_flip`
/// (fraction of crops whose predicted class changes).
#[derive(Debug, Clone)]
pub struct ShiftEquivariance {
    shift: i64,
}

impl ShiftEquivariance {
    pub fn new(shift: i64) -> Self {
        ShiftEquivariance { shift }
    }
}

impl Default for ShiftEquivariance {
    fn default() -> Self {
        ShiftEquivariance::new(1)
    }
}

impl<M: Module + ?Sized> MetricFamily<M, Crop> for ShiftEquivariance {
    fn name(&self) -> &str {
        "shift"
    }

    fn kind(&self) -> FamilyKind {
        FamilyKind::Discrete
    }

    fn columns(&self) -> Vec<String> {
        vec!["shift_err".to_string(), "shift_flip".to_string()]
    }

    fn evaluate(&self, model: &Frozen<'_, M>, batch: &[Crop]) -> Result<Vec<f64>, CellEqError> {
        if batch.is_empty() {
            return Err(empty_batch());
        }
        let mut err = 0.0;
        let mut flips = 0usize;
        for crop in batch {
            let base = model.forward(&crop.flatten())?;
            let moved = model.forward(&translated(crop, self.shift as f32))?;
            check_same_len(&base, &moved)?;
            let diff: Vec<f32> = moved.iter().zip(&base).map(|(m, b)| m - b).collect();
            err += l2(&diff) / (l2(&base) + NORM_EPS);
            if argmax(&base) != argmax(&moved) {
                flips += 1;
            }
        }
        let n = batch.len() as f64;
        Ok(vec![err / n, flips as f64 / n])
    }
}

/// Continuous family: finite-epsilon derivative of the logits along a
/// sub-pixel horizontal translation.
///
/// The translated crop is the linear interpolation between the crop and its
/// one-pixel shift, so `(f(x_eps) - f(x)) / eps` approximates the Lie
/// derivative of the model along the translation generator.
/// Column `lee_trans` is the mean squared derivative per logit.
#[derive(Debug, Clone)]
pub struct TranslationLieDerivative {
    epsilon: f32,
}

impl TranslationLieDerivative {
    pub fn new(epsilon: f32) -> Self {
        TranslationLieDerivative { epsilon }
    }
}

impl Default for TranslationLieDerivative {
    fn default() -> Self {
        TranslationLieDerivative::new(1e-2)
    }
}

impl<M: Module + ?Sized> MetricFamily<M, Crop> for TranslationLieDerivative {
    fn name(&self) -> &str {
        "lee"
    }

    fn kind(&self) -> FamilyKind {
        FamilyKind::Continuous
    }

    fn columns(&self) -> Vec<String> {
        vec!["lee_trans".to_string()]
    }

    fn evaluate(&self, model: &Frozen<'_, M>, batch: &[Crop]) -> Result<Vec<f64>, CellEqError> {
        if batch.is_empty() {
            return Err(empty_batch());
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(CellEqError::Numerical {
                operation: "lee_trans".to_string(),
                message: format!("epsilon must be positive, got {}", self.epsilon),
            });
        }
        let eps = self.epsilon as f64;
        let mut total = 0.0;
        for crop in batch {
            let base = model.forward(&crop.flatten())?;
            let moved = model.forward(&translated(crop, self.epsilon))?;
            check_same_len(&base, &moved)?;
            if base.is_empty() {
                continue;
            }
            let sq: f64 = moved
                .iter()
                .zip(&base)
                .map(|(m, b)| {
                    let d = (*m as f64 - *b as f64) / eps;
                    d * d
                })
                .sum();
            total += sq / base.len() as f64;
        }
        Ok(vec![total / batch.len() as f64])
    }
}

/// Flattened crop translated right by `amount` pixels (cyclic).
///
/// The integer part is a cyclic shift; a fractional remainder is linearly
/// interpolated with the next shift.
fn translated(crop: &Crop, amount: f32) -> Vec<f32> {
    let whole = amount.floor();
    let frac = amount - whole;
    let mut out = Vec::with_capacity(crop.channels() * crop.width());
    for row in &crop.pixels {
        let mut lo = row.clone();
        shift_row(&mut lo, whole as i64);
        if frac > 0.0 {
            let mut hi = row.clone();
            shift_row(&mut hi, whole as i64 + 1);
            out.extend(lo.iter().zip(&hi).map(|(a, b)| (1.0 - frac) * a + frac * b));
        } else {
            out.extend(lo);
        }
    }
    out
}

fn check_same_len(base: &[f32], moved: &[f32]) -> Result<(), CellEqError> {
    if base.len() != moved.len() {
        return Err(CellEqError::ShapeMismatch {
            expected: vec![base.len()],
            actual: vec![moved.len()],
            operation: "translated forward".to_string(),
        });
    }
    Ok(())
}

fn l2(values: &[f32]) -> f64 {
    values.iter().map(|v| (*v as f64) * (*v as f64)).sum::<f64>().sqrt()
}

fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

fn empty_batch() -> CellEqError {
    CellEqError::Numerical {
        operation: "metric batch".to_string(),
        message: "empty batch".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use celleq_core::nn::layers::Linear;
    use celleq_core::Parameter;

    /// Sums the pixels: invariant to any cyclic shift.
    fn summing_model(width: usize) -> Linear {
        let weight = Parameter::new_unnamed(vec![1.0; width], vec![1, width]).unwrap();
        Linear::from_parameters(weight, None).unwrap()
    }

    /// Reads the first pixel: sensitive to translation.
    fn first_pixel_model(width: usize) -> Linear {
        let mut w = vec![0.0; 2 * width];
        w[0] = 1.0;
        w[width] = -1.0;
        let weight = Parameter::new_unnamed(w, vec![2, width]).unwrap();
        Linear::from_parameters(weight, None).unwrap()
    }

    #[test]
    fn test_translated_integer_and_fractional() {
        let crop = Crop::new(0, vec![vec![1.0, 2.0, 3.0, 4.0]]);
        assert_eq!(translated(&crop, 1.0), vec![4.0, 1.0, 2.0, 3.0]);
        let half = translated(&crop, 0.5);
        assert_relative_eq!(half[0], 2.5);
        assert_relative_eq!(half[1], 1.5);
        assert_relative_eq!(half[3], 3.5);
    }

    #[test]
    fn test_invariant_model_scores_zero() -> Result<(), CellEqError> {
        let model = summing_model(4);
        let frozen = Frozen::new(&model);
        let batch = vec![
            Crop::new(0, vec![vec![1.0, 2.0, 3.0, 4.0]]),
            Crop::new(1, vec![vec![0.0, 5.0, 0.0, 1.0]]),
        ];
        let disc = ShiftEquivariance::default().evaluate(&frozen, &batch)?;
        assert_relative_eq!(disc[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(disc[1], 0.0);
        let lee = TranslationLieDerivative::default().evaluate(&frozen, &batch)?;
        assert_relative_eq!(lee[0], 0.0, epsilon = 1e-3);
        Ok(())
    }

    #[test]
    fn test_sensitive_model_flips_prediction() -> Result<(), CellEqError> {
        let model = first_pixel_model(3);
        let frozen = Frozen::new(&model);
        // logits [1, -1] before the shift, [-1, 1] after
        let batch = vec![Crop::new(0, vec![vec![1.0, 0.0, -1.0]])];
        let disc = ShiftEquivariance::default().evaluate(&frozen, &batch)?;
        assert_relative_eq!(disc[1], 1.0);
        assert!(disc[0] > 1.0);

        let lee = TranslationLieDerivative::new(0.5).evaluate(&frozen, &batch)?;
        // Both logits move by 1.0 over eps 0.5
        assert_relative_eq!(lee[0], 4.0, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn test_columns_are_declared_up_front() {
        let disc: &dyn MetricFamily<Linear, Crop> = &ShiftEquivariance::default();
        let lee: &dyn MetricFamily<Linear, Crop> = &TranslationLieDerivative::default();
        assert_eq!(disc.columns(), vec!["shift_err", "shift_flip"]);
        assert_eq!(disc.kind(), FamilyKind::Discrete);
        assert_eq!(lee.columns(), vec!["lee_trans"]);
        assert_eq!(lee.kind(), FamilyKind::Continuous);
    }

    #[test]
    fn test_model_shape_error_propagates() {
        let model = summing_model(5);
        let frozen = Frozen::new(&model);
        let batch = vec![Crop::new(0, vec![vec![1.0, 2.0]])];
        assert!(matches!(
            ShiftEquivariance::default().evaluate(&frozen, &batch),
            Err(CellEqError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
