//! CSV Data Loader Module
//! Loads entity-keyed tables from CSV files using Polars.

use crate::data::normal::{numeric_columns, ENTITY_ID_COL, TIMESTAMP_COL};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
    #[error("{path} is missing the '{column}' column")]
    MissingIndexColumn { path: PathBuf, column: &'static str },
}

/// Handles CSV file loading with Polars.
#[derive(Default)]
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a CSV file that carries `entity_id` and `timestamp` columns.
    pub fn load_csv(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame, LoaderError> {
        let path = file_path.as_ref().to_path_buf();

        let df = LazyCsvReader::new(&path)
            .with_infer_schema_length(Some(10000))
            .with_try_parse_dates(true)
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        for column in [ENTITY_ID_COL, TIMESTAMP_COL] {
            if !df.get_column_names().iter().any(|c| c.as_str() == column) {
                return Err(LoaderError::MissingIndexColumn { path, column });
            }
        }

        tracing::info!(path = %path.display(), rows = df.height(), "loaded csv");

        self.file_path = Some(path);
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value columns that can be drawn (numeric, index columns excluded).
    pub fn get_numeric_columns(&self) -> Vec<String> {
        self.df.as_ref().map(numeric_columns).unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Take ownership of the loaded DataFrame.
    pub fn into_dataframe(self) -> Result<DataFrame, LoaderError> {
        self.df.ok_or(LoaderError::NoData)
    }
}

/// Load a single CSV and return its DataFrame.
pub fn read_csv(file_path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
    let mut loader = DataLoader::new();
    loader.load_csv(file_path)?;
    loader.into_dataframe()
}
