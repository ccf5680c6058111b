use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a table. Fatal for that load: no
/// partial table is ever returned.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("reading arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("source has no header row")]
    NoHeader,

    #[error("required column '{0}' is missing")]
    MissingColumn(String),
}

/// Recoverable outcome of filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("no records match the selected filters")]
    EmptyResult,
}

/// Failure of a single chart or summary; never affects sibling views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("column '{0}' is not present in the data")]
    MissingColumn(String),

    #[error("column '{0}' has no values to plot")]
    NoValues(String),
}
