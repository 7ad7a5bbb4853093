use crate::datasets::population::{class_counts, LabeledItem, Population};
use log::{debug, info};
use rand::seq::index;
use rand::Rng;
use std::collections::BTreeMap;

/// Result of [`stratified_subsample`].
#[derive(Debug, Clone, PartialEq)]
pub struct Subsampled<T> {
    /// Retained items, grouped by label in ascending label order.
    pub items: Population<T>,
    /// Class histogram of the input population.
    pub counts_before: BTreeMap<i64, usize>,
}

/// Caps every class at `size` items.
///
/// For each label, classes with at least `size` items keep `size` items
/// drawn uniformly without replacement; smaller classes are kept whole.
/// A non-positive `size` keeps nothing. The output is grouped by label in
/// ascending order; within a label the retained items keep their input
/// order.
pub fn stratified_subsample<T, R>(items: Population<T>, size: i64, rng: &mut R) -> Subsampled<T>
where
    T: LabeledItem,
    R: Rng + ?Sized,
{
    let counts_before = class_counts(&items);
    info!("class sample count before: {:?}", counts_before);

    let cap = usize::try_from(size).unwrap_or(0);
    let mut buckets: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for item in items {
        buckets.entry(item.label()).or_default().push(item);
    }

    let mut retained = Vec::with_capacity(buckets.values().map(|b| b.len().min(cap)).sum());
    for (label, bucket) in buckets {
        let count = bucket.len();
        if count < cap {
            debug!("label {}: {} items below cap {}, keeping all", label, count, cap);
            retained.extend(bucket);
            continue;
        }
        let mut keep = vec![false; count];
        for i in index::sample(rng, count, cap).into_vec() {
            keep[i] = true;
        }
        debug!("label {}: sampled {} of {}", label, cap, count);
        retained.extend(
            bucket
                .into_iter()
                .zip(keep)
                .filter_map(|(item, kept)| kept.then_some(item)),
        );
    }

    Subsampled {
        items: retained,
        counts_before,
    }
}

#[cfg(test)]
#[path = "subsample_test.rs"]
mod tests;
