use celleq_core::utils::mean_std;
use celleq_core::CellEqError;
use std::collections::HashSet;

/// Aggregated statistic of one metric over the consumed batches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStat {
    pub mean: f64,
    /// Sample standard deviation across batches.
    pub std: f64,
    /// Number of batches aggregated; zero when the loader yielded nothing.
    pub batches: usize,
}

impl MetricStat {
    pub fn empty() -> Self {
        MetricStat {
            mean: f64::NAN,
            std: f64::NAN,
            batches: 0,
        }
    }

    pub fn from_values(values: &[f64]) -> Self {
        match mean_std(values) {
            Some(s) => MetricStat {
                mean: s.mean,
                std: s.std,
                batches: s.count,
            },
            None => MetricStat::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batches == 0
    }
}

/// One aggregated row: an ordered set of metric columns with their statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    columns: Vec<String>,
    stats: Vec<MetricStat>,
}

impl MetricRow {
    /// # Errors
    /// `ShapeMismatch` when `columns` and `stats` differ in length,
    /// `SchemaCollision` when a column name repeats.
    pub fn new(columns: Vec<String>, stats: Vec<MetricStat>) -> Result<Self, CellEqError> {
        if columns.len() != stats.len() {
            return Err(CellEqError::ShapeMismatch {
                expected: vec![columns.len()],
                actual: vec![stats.len()],
                operation: "MetricRow::new".to_string(),
            });
        }
        ensure_disjoint(columns.iter())?;
        Ok(MetricRow { columns, stats })
    }

    /// Aggregates per-batch observations. `per_batch[b][c]` is the value of
    /// column `c` on batch `b`.
    ///
    /// # Errors
    /// `ShapeMismatch` when a batch does not hold exactly `columns.len()`
    /// values.
    pub fn from_batches(columns: Vec<String>, per_batch: &[Vec<f64>]) -> Result<Self, CellEqError> {
        let ragged = per_batch
            .iter()
            .enumerate()
            .find(|(_, batch)| batch.len() != columns.len());
        if let Some((b, batch)) = ragged {
            return Err(CellEqError::ShapeMismatch {
                expected: vec![columns.len()],
                actual: vec![batch.len()],
                operation: format!("MetricRow::from_batches (batch {})", b),
            });
        }
        let stats = (0..columns.len())
            .map(|c| {
                let values: Vec<f64> = per_batch.iter().map(|batch| batch[c]).collect();
                MetricStat::from_values(&values)
            })
            .collect();
        MetricRow::new(columns, stats)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&MetricStat> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.stats[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricStat)> {
        self.columns.iter().map(String::as_str).zip(self.stats.iter())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Horizontal concatenation: `self`'s columns first, then `other`'s.
    ///
    /// # Errors
    /// `SchemaCollision` naming the first column present in both rows.
    pub fn merge(mut self, other: MetricRow) -> Result<MetricRow, CellEqError> {
        ensure_disjoint(self.columns.iter().chain(other.columns.iter()))?;
        self.columns.extend(other.columns);
        self.stats.extend(other.stats);
        Ok(self)
    }
}

/// Fails with `SchemaCollision` on the first repeated column name.
pub fn ensure_disjoint<'a>(columns: impl Iterator<Item = &'a String>) -> Result<(), CellEqError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(CellEqError::SchemaCollision {
                column: column.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_batches_mean_and_std() -> Result<(), CellEqError> {
        let row = MetricRow::from_batches(
            names(&["a", "b"]),
            &[vec![1.0, 10.0], vec![3.0, 10.0], vec![5.0, 10.0]],
        )?;
        let a = row.get("a").unwrap();
        assert_relative_eq!(a.mean, 3.0);
        assert_relative_eq!(a.std, 2.0);
        assert_eq!(a.batches, 3);
        let b = row.get("b").unwrap();
        assert_relative_eq!(b.std, 0.0);
        Ok(())
    }

    #[test]
    fn test_from_batches_without_batches_is_empty_stat() -> Result<(), CellEqError> {
        let row = MetricRow::from_batches(names(&["a"]), &[])?;
        assert!(row.get("a").unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_from_batches_rejects_ragged_batches() {
        let short = MetricRow::from_batches(names(&["a", "b"]), &[vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(
            short,
            Err(CellEqError::ShapeMismatch {
                expected: vec![2],
                actual: vec![1],
                operation: "MetricRow::from_batches (batch 1)".to_string(),
            })
        );
        assert!(matches!(
            MetricRow::from_batches(names(&["a"]), &[vec![1.0, 2.0]]),
            Err(CellEqError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_merge_puts_left_columns_first() -> Result<(), CellEqError> {
        let lee = MetricRow::from_batches(names(&["lee_a", "lee_b"]), &[vec![1.0, 2.0]])?;
        let disc = MetricRow::from_batches(names(&["disc_x"]), &[vec![3.0]])?;
        let merged = lee.merge(disc)?;
        assert_eq!(merged.columns(), &names(&["lee_a", "lee_b", "disc_x"])[..]);
        assert_eq!(merged.len(), 3);
        assert_relative_eq!(merged.get("disc_x").unwrap().mean, 3.0);
        Ok(())
    }

    #[test]
    fn test_merge_collision_fails_fast() -> Result<(), CellEqError> {
        let left = MetricRow::from_batches(names(&["x", "y"]), &[vec![1.0, 2.0]])?;
        let right = MetricRow::from_batches(names(&["y"]), &[vec![3.0]])?;
        assert_eq!(
            left.merge(right),
            Err(CellEqError::SchemaCollision { column: "y".into() })
        );
        Ok(())
    }

    #[test]
    fn test_new_rejects_duplicates_and_length_mismatch() {
        assert!(matches!(
            MetricRow::new(names(&["a", "a"]), vec![MetricStat::empty(); 2]),
            Err(CellEqError::SchemaCollision { .. })
        ));
        assert!(matches!(
            MetricRow::new(names(&["a"]), vec![]),
            Err(CellEqError::ShapeMismatch { .. })
        ));
    }
}
