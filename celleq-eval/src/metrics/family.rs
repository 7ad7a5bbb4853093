use celleq_core::{CellEqError, Frozen, Module};
use std::fmt;

/// Which of the two metric procedures a family implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKind {
    /// Differential, Lie-derivative style metrics.
    Continuous,
    /// Finite-difference metrics over discrete transformations.
    Discrete,
}

/// A metric procedure evaluated batch by batch.
///
/// The column schema is declared up front; `evaluate` returns exactly one
/// value per declared column, in the same order.
pub trait MetricFamily<M: Module + ?Sized, I> {
    fn name(&self) -> &str;

    fn kind(&self) -> FamilyKind;

    fn columns(&self) -> Vec<String>;

    /// Computes the per-batch value of every column.
    fn evaluate(&self, model: &Frozen<'_, M>, batch: &[I]) -> Result<Vec<f64>, CellEqError>;
}

/// A metric family backed by a closure, for plugging in external evaluators.
pub struct FnFamily<M: Module + ?Sized, I> {
    name: String,
    kind: FamilyKind,
    columns: Vec<String>,
    #[allow(clippy::type_complexity)]
    eval: Box<dyn Fn(&Frozen<'_, M>, &[I]) -> Result<Vec<f64>, CellEqError> + Send + Sync>,
}

impl<M: Module + ?Sized, I> FnFamily<M, I> {
    pub fn new<F>(name: &str, kind: FamilyKind, columns: &[&str], eval: F) -> Self
    where
        F: Fn(&Frozen<'_, M>, &[I]) -> Result<Vec<f64>, CellEqError> + Send + Sync + 'static,
    {
        FnFamily {
            name: name.to_string(),
            kind,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            eval: Box::new(eval),
        }
    }
}

impl<M: Module + ?Sized, I> fmt::Debug for FnFamily<M, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFamily")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<M: Module + ?Sized, I> MetricFamily<M, I> for FnFamily<M, I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> FamilyKind {
        self.kind
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn evaluate(&self, model: &Frozen<'_, M>, batch: &[I]) -> Result<Vec<f64>, CellEqError> {
        (self.eval)(model, batch)
    }
}
