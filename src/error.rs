//! Error types shared by the data and chart modules.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while normalizing input tables.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Column '{column}' has {actual} values, index has {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),
}

/// Errors raised while building, saving or showing figures.
#[derive(Error, Debug)]
pub enum DrawerError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}
