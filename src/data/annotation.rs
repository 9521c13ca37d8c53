//! Annotation table: labeled markers keyed by (entity, timestamp).

use crate::data::normal::{f64_values, string_values, timestamp_values, ENTITY_ID_COL, TIMESTAMP_COL};
use crate::error::DataError;
use chrono::NaiveDateTime;
use polars::prelude::*;

/// One annotation marker.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRow {
    pub entity_id: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub flag: String,
    /// Background color; the drawer default is used when absent.
    pub color: Option<String>,
}

/// Annotation rows grouped by entity id, input order kept inside each group.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    rows: Vec<AnnotationRow>,
}

impl AnnotationTable {
    pub fn from_rows(mut rows: Vec<AnnotationRow>) -> Self {
        // Stable: rows of one entity keep their relative order.
        rows.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        Self { rows }
    }

    /// Read `entity_id`, `timestamp`, `value`, `flag` and optional `color` columns.
    ///
    /// Rows missing the entity id, timestamp or value are dropped.
    pub fn from_df(df: &DataFrame) -> Result<Self, DataError> {
        let entity_ids = string_values(df, ENTITY_ID_COL)?;
        let timestamps = timestamp_values(df, TIMESTAMP_COL)?;
        let values = f64_values(df, "value")?;
        let flags = string_values(df, "flag")?;
        let colors = if df.get_column_names().iter().any(|c| c.as_str() == "color") {
            string_values(df, "color")?
        } else {
            vec![None; df.height()]
        };

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let (Some(entity_id), Some(timestamp), Some(value)) =
                (&entity_ids[i], timestamps[i], values[i])
            else {
                tracing::debug!(row = i, "dropping incomplete annotation row");
                continue;
            };

            rows.push(AnnotationRow {
                entity_id: entity_id.clone(),
                timestamp,
                value,
                flag: flags[i].clone().unwrap_or_default(),
                color: colors[i].clone(),
            });
        }

        Ok(Self::from_rows(rows))
    }

    pub fn rows(&self) -> &[AnnotationRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
