// celleq-data/src/samplers/sequential_sampler_test.rs

use super::*;

#[test]
fn test_sequential_sampler_len() {
    let sampler = SequentialSampler::new();
    assert_eq!(sampler.len(0), 0);
    assert_eq!(sampler.len(100), 100);
}

#[test]
fn test_sequential_sampler_iter_empty() {
    let sampler = SequentialSampler::new();
    assert_eq!(sampler.iter(0).next(), None);
}

#[test]
fn test_sequential_sampler_stable_across_traversals() {
    let sampler = SequentialSampler::new();
    let first: Vec<usize> = sampler.iter(5).collect();
    let second: Vec<usize> = sampler.iter(5).collect();
    assert_eq!(first, vec![0, 1, 2, 3, 4]);
    assert_eq!(first, second);
}

#[test]
fn test_boxed_sampler_delegates() {
    let boxed: Box<dyn Sampler> = Box::new(SequentialSampler::new());
    assert_eq!(boxed.len(3), 3);
    assert_eq!(boxed.iter(3).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert!(boxed.check(3).is_ok());
}
