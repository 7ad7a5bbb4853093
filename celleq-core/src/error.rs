use thiserror::Error;

/// Custom error type for the celleq workspace.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum CellEqError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Index out of bounds: index {index} for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Missing required configuration key '{0}'")]
    MissingConfigKey(String),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    #[error("Label {label} has no entry in the category map")]
    MissingCategory { label: i64 },

    #[error("Invalid sampling weights: {0}")]
    InvalidWeights(String),

    #[error("Metric family '{family}' failed on batch {batch}: {message}")]
    Evaluation {
        family: String,
        batch: usize,
        message: String,
    },

    #[error("Column '{column}' is produced by more than one metric family")]
    SchemaCollision { column: String },

    #[error("Numerical error in {operation}: {message}")]
    Numerical { operation: String, message: String },

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CellEqError {
    /// Wraps an `std::io::Error` together with the path it occurred on.
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        CellEqError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// True for the configuration error family (missing or malformed keys).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CellEqError::MissingConfigKey(_) | CellEqError::InvalidConfig { .. }
        )
    }
}
