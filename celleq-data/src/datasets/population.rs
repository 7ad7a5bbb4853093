//! Labeled populations and their class histograms.

use std::collections::BTreeMap;

/// An item carrying an integer class label.
///
/// Negative labels mark invalid or unlabeled items; they are removed by
/// [`retain_labeled`] before any balancing takes place.
pub trait LabeledItem {
    fn label(&self) -> i64;
}

impl LabeledItem for i64 {
    fn label(&self) -> i64 {
        *self
    }
}

impl<T> LabeledItem for (i64, T) {
    fn label(&self) -> i64 {
        self.0
    }
}

/// An ordered collection of labeled items. Order carries no meaning, but
/// operations that do not document a reordering preserve it.
pub type Population<T> = Vec<T>;

/// Counts items per label, keyed in ascending label order.
///
/// Always computed from the items passed in; nothing is cached.
pub fn class_counts<T: LabeledItem>(items: &[T]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(item.label()).or_insert(0) += 1;
    }
    counts
}

/// Drops items whose label is negative, keeping the original order.
pub fn retain_labeled<T: LabeledItem>(items: Population<T>) -> Population<T> {
    let before = items.len();
    let kept: Population<T> = items.into_iter().filter(|item| item.label() >= 0).collect();
    if kept.len() != before {
        log::debug!(
            "retain_labeled: dropped {} unlabeled items, {} remain",
            before - kept.len(),
            kept.len()
        );
    }
    kept
}
