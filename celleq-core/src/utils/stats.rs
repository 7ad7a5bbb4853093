use num_traits::Float;

/// Mean and sample standard deviation of a series of observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanStd<T> {
    pub mean: T,
    /// Sample standard deviation (denominator `n - 1`); zero for a single observation.
    pub std: T,
    pub count: usize,
}

/// Computes mean and sample standard deviation of `values`.
///
/// Returns `None` for an empty slice.
pub fn mean_std<T: Float>(values: &[T]) -> Option<MeanStd<T>> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    let n = T::from(count)?;
    let mean = values.iter().fold(T::zero(), |acc, &v| acc + v) / n;
    let std = if count < 2 {
        T::zero()
    } else {
        let sq = values
            .iter()
            .fold(T::zero(), |acc, &v| acc + (v - mean) * (v - mean));
        (sq / (n - T::one())).sqrt()
    };
    Some(MeanStd { mean, std, count })
}
