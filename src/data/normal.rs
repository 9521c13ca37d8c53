//! Entity-keyed data group.
//!
//! Raw input is a long table with an `entity_id` column, a `timestamp` column
//! and any number of value columns. It is split once into one [`EntityFrame`]
//! per entity so the drawer never branches on input shape.

use crate::data::EntityFrame;
use crate::error::DataError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use std::collections::BTreeMap;

pub const ENTITY_ID_COL: &str = "entity_id";
pub const TIMESTAMP_COL: &str = "timestamp";

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// One flattened row of a data group: the two-level index plus its values.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub entity_id: String,
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

/// Mapping from entity id to its time-indexed frame.
#[derive(Debug, Clone, Default)]
pub struct NormalData {
    entity_map: BTreeMap<String, EntityFrame>,
    columns: Vec<String>,
}

impl NormalData {
    /// Normalize a long table keyed by (`entity_id`, `timestamp`).
    ///
    /// Non-numeric value columns are ignored; rows with a null entity id or
    /// timestamp are dropped.
    pub fn from_df(df: &DataFrame) -> Result<Self, DataError> {
        let entity_ids = string_values(df, ENTITY_ID_COL)?;
        let timestamps = timestamp_values(df, TIMESTAMP_COL)?;

        let value_columns = numeric_columns(df);
        let mut values: Vec<(String, Vec<Option<f64>>)> = Vec::with_capacity(value_columns.len());
        for name in value_columns {
            match f64_values(df, &name) {
                Ok(v) => values.push((name, v)),
                Err(e) => tracing::warn!(column = %name, error = %e, "skipping column"),
            }
        }

        // Group row positions by entity, preserving row order.
        let mut rows_by_entity: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, (entity, ts)) in entity_ids.iter().zip(timestamps.iter()).enumerate() {
            match (entity, ts) {
                (Some(e), Some(_)) => rows_by_entity.entry(e.clone()).or_default().push(i),
                _ => tracing::debug!(row = i, "dropping row without entity id or timestamp"),
            }
        }

        let mut entity_map = BTreeMap::new();
        for (entity_id, rows) in rows_by_entity {
            let index = rows.iter().filter_map(|&i| timestamps[i]).collect();
            let columns = values
                .iter()
                .map(|(name, col)| (name.clone(), rows.iter().map(|&i| col[i]).collect()))
                .collect();
            entity_map.insert(entity_id, EntityFrame::new(index, columns)?);
        }

        Ok(Self {
            columns: values.into_iter().map(|(name, _)| name).collect(),
            entity_map,
        })
    }

    /// Wrap frames that are already split per entity.
    pub fn from_entity_map<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = (S, EntityFrame)>,
        S: Into<String>,
    {
        let mut entity_map = BTreeMap::new();
        let mut columns: Vec<String> = Vec::new();

        for (entity_id, frame) in frames {
            for name in frame.column_names() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
            entity_map.insert(entity_id.into(), frame);
        }

        Self {
            entity_map,
            columns,
        }
    }

    /// True when no entity has any rows.
    pub fn is_empty(&self) -> bool {
        self.entity_map.values().all(|f| f.is_empty())
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.entity_map.keys().map(|k| k.as_str())
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityFrame> {
        self.entity_map.get(entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityFrame)> {
        self.entity_map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Union of value column names, in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Flatten to (entity, timestamp) rows aligned with [`NormalData::columns`].
    pub fn table_rows(&self) -> Vec<TableRow> {
        let mut rows = Vec::new();
        for (entity_id, frame) in &self.entity_map {
            let cols: Vec<Option<&[Option<f64>]>> =
                self.columns.iter().map(|c| frame.column(c)).collect();

            for (i, ts) in frame.index().iter().enumerate() {
                rows.push(TableRow {
                    entity_id: entity_id.clone(),
                    timestamp: *ts,
                    values: cols.iter().map(|c| c.and_then(|v| v[i])).collect(),
                });
            }
        }
        rows
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Numeric columns other than the two index columns.
pub(crate) fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            let name = col.name().as_str();
            name != ENTITY_ID_COL && name != TIMESTAMP_COL && is_numeric(col.dtype())
        })
        .map(|col| col.name().to_string())
        .collect()
}

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, DataError> {
    df.column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))
}

pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DataError> {
    let column = required_column(df, name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DataError> {
    let column = required_column(df, name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Read a timestamp column stored as Datetime, Date or text.
pub(crate) fn timestamp_values(
    df: &DataFrame,
    name: &str,
) -> Result<Vec<Option<NaiveDateTime>>, DataError> {
    let column = required_column(df, name)?;

    match column.dtype() {
        DataType::String => Ok(column
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_timestamp))
            .collect()),
        dtype => {
            if dtype.is_integer() {
                tracing::warn!(
                    column = name,
                    %dtype,
                    "integer timestamps are read as epoch milliseconds"
                );
            }
            let millis = column
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            Ok(millis
                .i64()?
                .into_iter()
                .map(|v| v.and_then(DateTime::<Utc>::from_timestamp_millis).map(|d| d.naive_utc()))
                .collect())
        }
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
