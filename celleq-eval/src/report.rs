//! The final report: one row per evaluated dataset.

use crate::metrics::{ensure_disjoint, MetricRow, MetricStat};
use celleq_core::CellEqError;
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DATASET_COLUMN: &str = "dataset";
pub const MODEL_COLUMN: &str = "model";
pub const PARAMS_COLUMN: &str = "params";

const METADATA_COLUMNS: [&str; 3] = [DATASET_COLUMN, MODEL_COLUMN, PARAMS_COLUMN];

/// CSV header names for the given metric columns: `<name>` and
/// `<name>_std` for each, then the metadata columns.
fn rendered_header<'a>(metric_columns: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut header: Vec<String> = metric_columns
        .into_iter()
        .flat_map(|c| [c.clone(), format!("{}_std", c)])
        .collect();
    header.extend(METADATA_COLUMNS.map(String::from));
    header
}

/// Checks that `metric_columns` render to a CSV header without repeats.
///
/// # Errors
/// `SchemaCollision` when a metric repeats, is named like a metadata column,
/// or matches another metric's `_std` column.
pub fn ensure_renderable<'a>(metric_columns: impl IntoIterator<Item = &'a String>) -> Result<(), CellEqError> {
    ensure_disjoint(rendered_header(metric_columns).iter())
}

/// A metric row stamped with the dataset it was computed on and the model
/// that was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedRow {
    pub metrics: MetricRow,
    pub dataset: String,
    pub model: String,
    /// Total parameter element count of the model at evaluation time.
    pub params: usize,
}

/// One cell of the report. Absent cells are `None` from [`Report::cell`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Stat(&'a MetricStat),
    Text(&'a str),
    Count(usize),
}

/// A dataset whose row was dropped under the skip policy.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFailure {
    pub dataset: String,
    pub error: CellEqError,
}

/// Vertical concatenation of stamped rows.
///
/// Columns are the outer union of every row's metric columns in order of
/// first appearance, followed by `dataset`, `model` and `params`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    metric_columns: Vec<String>,
    rows: Vec<StampedRow>,
    failures: Vec<DatasetFailure>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = StampedRow>) -> Result<Self, CellEqError> {
        let mut report = Report::new();
        for row in rows {
            report.push(row)?;
        }
        Ok(report)
    }

    /// Appends a row, extending the column union with its new metrics.
    ///
    /// # Errors
    /// `SchemaCollision` when the extended union would not render to a
    /// unique CSV header. The report is left unchanged.
    pub fn push(&mut self, row: StampedRow) -> Result<(), CellEqError> {
        let mut columns = self.metric_columns.clone();
        for column in row.metrics.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        ensure_renderable(&columns)?;
        self.metric_columns = columns;
        self.rows.push(row);
        Ok(())
    }

    pub fn record_failure(&mut self, dataset: &str, error: CellEqError) {
        self.failures.push(DatasetFailure {
            dataset: dataset.to_string(),
            error,
        });
    }

    pub fn metric_columns(&self) -> &[String] {
        &self.metric_columns
    }

    /// All logical columns, metadata last.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.metric_columns.clone();
        columns.extend(METADATA_COLUMNS.map(String::from));
        columns
    }

    pub fn rows(&self) -> &[StampedRow] {
        &self.rows
    }

    pub fn failures(&self) -> &[DatasetFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The value at (`row`, `column`), or `None` when the row lacks that
    /// metric or the indices are out of range.
    pub fn cell(&self, row: usize, column: &str) -> Option<Cell<'_>> {
        let row = self.rows.get(row)?;
        match column {
            DATASET_COLUMN => Some(Cell::Text(&row.dataset)),
            MODEL_COLUMN => Some(Cell::Text(&row.model)),
            PARAMS_COLUMN => Some(Cell::Count(row.params)),
            metric => row.metrics.get(metric).map(Cell::Stat),
        }
    }

    /// CSV header: every metric as `<name>` (mean) and `<name>_std`, then
    /// the metadata columns.
    pub fn csv_header(&self) -> Vec<String> {
        rendered_header(&self.metric_columns)
    }

    /// Writes the report as CSV. Missing cells and stats aggregated over
    /// zero batches are written empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CellEqError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.csv_header()).map_err(csv_error)?;
        for row in &self.rows {
            let mut record: Vec<String> = Vec::with_capacity(self.metric_columns.len() * 2 + 3);
            for column in &self.metric_columns {
                match row.metrics.get(column) {
                    Some(stat) if !stat.is_empty() => {
                        record.push(stat.mean.to_string());
                        record.push(stat.std.to_string());
                    }
                    _ => {
                        record.push(String::new());
                        record.push(String::new());
                    }
                }
            }
            record.push(row.dataset.clone());
            record.push(row.model.clone());
            record.push(row.params.to_string());
            csv_writer.write_record(&record).map_err(csv_error)?;
        }
        csv_writer
            .flush()
            .map_err(|e| CellEqError::Serialization(e.to_string()))
    }

    /// Writes `<dir>/<model_name>.csv` and returns its path.
    pub fn save(&self, dir: &Path, model_name: &str) -> Result<PathBuf, CellEqError> {
        let path = dir.join(format!("{}.csv", model_name));
        let file = File::create(&path).map_err(|e| CellEqError::io(&path, e))?;
        self.write_csv(file)?;
        info!("report with {} rows written to {}", self.len(), path.display());
        Ok(path)
    }
}

fn csv_error(err: csv::Error) -> CellEqError {
    CellEqError::Serialization(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped(columns: &[&str], values: &[f64], dataset: &str) -> StampedRow {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        StampedRow {
            metrics: MetricRow::from_batches(columns, &[values.to_vec()]).unwrap(),
            dataset: dataset.to_string(),
            model: "classifier".to_string(),
            params: 43,
        }
    }

    #[test]
    fn test_columns_are_outer_union() -> Result<(), CellEqError> {
        let report = Report::from_rows(vec![
            stamped(&["a", "b"], &[1.0, 2.0], "train"),
            stamped(&["b", "c"], &[3.0, 4.0], "val"),
        ])?;
        assert_eq!(report.len(), 2);
        assert_eq!(
            report.columns(),
            vec!["a", "b", "c", "dataset", "model", "params"]
        );
        assert_eq!(report.cell(1, "a"), None);
        assert_eq!(report.cell(0, "dataset"), Some(Cell::Text("train")));
        assert_eq!(report.cell(1, "params"), Some(Cell::Count(43)));
        assert!(matches!(report.cell(1, "c"), Some(Cell::Stat(s)) if s.mean == 4.0));
        assert_eq!(report.cell(2, "a"), None);
        Ok(())
    }

    #[test]
    fn test_write_csv_renders_mean_std_and_blanks() -> Result<(), CellEqError> {
        let report = Report::from_rows(vec![
            stamped(&["a"], &[1.5], "train"),
            stamped(&["b"], &[2.0], "val"),
        ])?;
        let mut buffer = Vec::new();
        report.write_csv(&mut buffer)?;
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a,a_std,b,b_std,dataset,model,params");
        assert_eq!(lines[1], "1.5,0,,,train,classifier,43");
        assert_eq!(lines[2], ",,2,0,val,classifier,43");
        Ok(())
    }

    #[test]
    fn test_empty_stat_written_blank() -> Result<(), CellEqError> {
        let row = StampedRow {
            metrics: MetricRow::from_batches(vec!["a".to_string()], &[])?,
            dataset: "val".to_string(),
            model: "m".to_string(),
            params: 0,
        };
        let mut buffer = Vec::new();
        Report::from_rows(vec![row])?.write_csv(&mut buffer)?;
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().nth(1), Some(",,val,m,0"));
        Ok(())
    }

    #[test]
    fn test_save_uses_model_name() -> Result<(), CellEqError> {
        let dir = tempfile::tempdir().unwrap();
        let report = Report::from_rows(vec![stamped(&["a"], &[1.0], "train")])?;
        let path = report.save(dir.path(), "resnet18")?;
        assert_eq!(path, dir.path().join("resnet18.csv"));
        assert!(std::fs::read_to_string(path).unwrap().starts_with("a,a_std"));
        Ok(())
    }

    #[test]
    fn test_push_rejects_header_collisions() -> Result<(), CellEqError> {
        let mut report = Report::new();
        report.push(stamped(&["a"], &[1.0], "train"))?;

        // `a_std` would repeat the std column of `a`
        assert_eq!(
            report.push(stamped(&["a_std"], &[2.0], "val")),
            Err(CellEqError::SchemaCollision { column: "a_std".into() })
        );
        // a metric named like a metadata column
        assert_eq!(
            report.push(stamped(&["params"], &[7.0], "val")),
            Err(CellEqError::SchemaCollision { column: "params".into() })
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report.metric_columns(), &["a".to_string()][..]);
        assert_eq!(report.csv_header(), vec!["a", "a_std", "dataset", "model", "params"]);
        Ok(())
    }

    #[test]
    fn test_ensure_renderable() {
        let names = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert!(ensure_renderable(&names(&["lee_a", "lee_b", "disc_x"])).is_ok());
        assert!(ensure_renderable(&names(&["x_std_mean", "x"])).is_ok());
        assert_eq!(
            ensure_renderable(&names(&["x", "model"])),
            Err(CellEqError::SchemaCollision { column: "model".into() })
        );
        assert_eq!(
            ensure_renderable(&names(&["x_std", "x"])),
            Err(CellEqError::SchemaCollision { column: "x_std".into() })
        );
    }
}
