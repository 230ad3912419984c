//! Ошибки пайплайна

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("failed to read workbook row: {0}")]
    SpreadsheetRow(#[from] calamine::DeError),

    #[error("model artifact error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Model '{0}' not recognized!")]
    UnrecognizedModel(String),

    #[error("column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("column '{column}' has no numeric value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("{0} not fitted")]
    NotFitted(&'static str),

    #[error("fit failed: {0}")]
    Fit(String),

    #[error("plot rendering failed: {0}")]
    Plot(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
