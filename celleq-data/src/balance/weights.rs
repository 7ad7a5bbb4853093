use crate::datasets::population::LabeledItem;
use celleq_core::CellEqError;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Coarse category identifier. Category maps may name categories with
/// integers or strings; without a map every label is its own `Id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryId {
    Id(i64),
    Name(String),
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryId::Id(id) => write!(f, "{}", id),
            CategoryId::Name(name) => f.write_str(name),
        }
    }
}

/// Mapping from fine label to coarse category.
pub type CategoryMap = HashMap<i64, CategoryId>;

/// Inverse-frequency draw weights over a population.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWeights {
    /// One weight per item, aligned with the population.
    pub weights: Vec<f64>,
    /// Items per category.
    pub counts: BTreeMap<CategoryId, usize>,
    /// Per-item weight of every category: `total / counts[c]`.
    pub per_category: BTreeMap<CategoryId, f64>,
}

impl CategoryWeights {
    pub fn total(&self) -> usize {
        self.weights.len()
    }
}

/// Resolves the category of `label`, by identity when no map is given.
pub fn category_of(label: i64, map: Option<&CategoryMap>) -> Result<CategoryId, CellEqError> {
    match map {
        None => Ok(CategoryId::Id(label)),
        Some(map) => map
            .get(&label)
            .cloned()
            .ok_or(CellEqError::MissingCategory { label }),
    }
}

/// Computes weights so that every category present has the same expected
/// draw frequency under weighted sampling with replacement.
///
/// Every item of category `c` receives `total / count[c]`, hence
/// `count[c] * weight[c] == total` for all categories.
///
/// # Errors
///
/// `CellEqError::MissingCategory` when a map is supplied and an item's label
/// has no entry.
pub fn category_weights<T: LabeledItem>(
    items: &[T],
    map: Option<&CategoryMap>,
) -> Result<CategoryWeights, CellEqError> {
    let categories = items
        .iter()
        .map(|item| category_of(item.label(), map))
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts: BTreeMap<CategoryId, usize> = BTreeMap::new();
    for category in &categories {
        *counts.entry(category.clone()).or_insert(0) += 1;
    }
    info!("class sample count after: {:?}", counts);

    let total = categories.len() as f64;
    let per_category: BTreeMap<CategoryId, f64> = counts
        .iter()
        .map(|(category, &count)| (category.clone(), total / count as f64))
        .collect();
    let weights = categories
        .iter()
        .map(|category| per_category[category])
        .collect();

    Ok(CategoryWeights {
        weights,
        counts,
        per_category,
    })
}

#[cfg(test)]
#[path = "weights_test.rs"]
mod tests;
