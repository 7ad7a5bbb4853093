//! Metric families, their per-run aggregation and the rows they produce.

pub mod family;
pub mod reference;
pub mod row;
pub mod run;

pub use family::{FamilyKind, FnFamily, MetricFamily};
pub use reference::{ShiftEquivariance, TranslationLieDerivative};
pub use row::{ensure_disjoint, MetricRow, MetricStat};
pub use run::evaluate_family;
