use super::family::MetricFamily;
use super::row::MetricRow;
use celleq_core::{CellEqError, Frozen, Module};
use celleq_data::BatchSource;
use log::{debug, info};

/// Runs one metric family over at most `max_batches` batches of `source`
/// and aggregates every column into mean and std.
///
/// Any failure is fatal for the run: a loader error, a model or metric error,
/// a result of the wrong width, or a non-finite value. Family errors are
/// reported as `CellEqError::Evaluation` naming the family and batch index.
pub fn evaluate_family<M, I>(
    source: &dyn BatchSource<I>,
    family: &dyn MetricFamily<M, I>,
    model: &Frozen<'_, M>,
    max_batches: usize,
) -> Result<MetricRow, CellEqError>
where
    M: Module + ?Sized,
{
    let columns = family.columns();
    let total = max_batches.min(source.num_batches());
    info!(
        "evaluating '{}' ({:?}) over {} batches",
        family.name(),
        family.kind(),
        total
    );

    let mut per_batch: Vec<Vec<f64>> = Vec::with_capacity(total);
    for (idx, batch) in source.batches().take(max_batches).enumerate() {
        let batch = batch?;
        let values = family
            .evaluate(model, &batch)
            .map_err(|e| evaluation_error(family.name(), idx, e))?;
        if values.len() != columns.len() {
            return Err(CellEqError::Evaluation {
                family: family.name().to_string(),
                batch: idx,
                message: format!(
                    "expected {} values for columns {:?}, got {}",
                    columns.len(),
                    columns,
                    values.len()
                ),
            });
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(CellEqError::Evaluation {
                family: family.name().to_string(),
                batch: idx,
                message: format!("non-finite value {} for column '{}'", values[pos], columns[pos]),
            });
        }
        debug!("'{}' batch {}: {:?}", family.name(), idx, values);
        per_batch.push(values);
    }

    MetricRow::from_batches(columns, &per_batch)
}

fn evaluation_error(family: &str, batch: usize, err: CellEqError) -> CellEqError {
    match err {
        e @ CellEqError::Evaluation { .. } => e,
        other => CellEqError::Evaluation {
            family: family.to_string(),
            batch,
            message: other.to_string(),
        },
    }
}
