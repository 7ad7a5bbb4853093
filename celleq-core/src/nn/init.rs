use rand::distributions::{Distribution, Uniform};
use rand::Rng;

/// Samples `numel` values from U(-bound, bound) with `bound = gain / sqrt(fan_in)`.
///
/// With `gain = 1` this is the default initialisation of linear layers
/// (Kaiming-uniform with `a = sqrt(5)` reduces to the same bound).
pub fn uniform_fan_in<R: Rng + ?Sized>(numel: usize, fan_in: usize, gain: f32, rng: &mut R) -> Vec<f32> {
    if fan_in == 0 {
        return vec![0.0; numel];
    }
    let bound = gain / (fan_in as f32).sqrt();
    let dist = Uniform::new_inclusive(-bound, bound);
    (0..numel).map(|_| dist.sample(rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_fan_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let values = uniform_fan_in(1000, 16, 1.0, &mut rng);
        assert_eq!(values.len(), 1000);
        assert!(values.iter().all(|v| v.abs() <= 0.25));
        // Not all identical
        assert!(values.iter().any(|&v| v != values[0]));
    }

    #[test]
    fn test_uniform_fan_in_zero_fan_in() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(uniform_fan_in(3, 0, 1.0, &mut rng), vec![0.0; 3]);
    }

    #[test]
    fn test_uniform_fan_in_is_seeded() {
        let a = uniform_fan_in(8, 4, 1.0, &mut StdRng::seed_from_u64(11));
        let b = uniform_fan_in(8, 4, 1.0, &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
