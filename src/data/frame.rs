//! Per-entity time-indexed frame.

use crate::error::DataError;
use chrono::NaiveDateTime;

/// One entity's rows: an ascending, unique timestamp index plus named numeric columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFrame {
    index: Vec<NaiveDateTime>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl EntityFrame {
    /// Build a frame, sorting rows by timestamp.
    ///
    /// Rows sharing a timestamp collapse to the last one supplied.
    pub fn new(
        index: Vec<NaiveDateTime>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, DataError> {
        for (name, values) in &columns {
            if values.len() != index.len() {
                return Err(DataError::LengthMismatch {
                    column: name.clone(),
                    expected: index.len(),
                    actual: values.len(),
                });
            }
        }

        // Stable sort keeps input order among equal timestamps, so the last
        // duplicate is the one that survives below.
        let mut order: Vec<usize> = (0..index.len()).collect();
        order.sort_by_key(|&i| index[i]);

        let mut keep: Vec<usize> = Vec::with_capacity(order.len());
        for i in order {
            match keep.last_mut() {
                Some(last) if index[*last] == index[i] => *last = i,
                _ => keep.push(i),
            }
        }

        if keep.len() != index.len() {
            tracing::debug!(
                dropped = index.len() - keep.len(),
                "collapsed duplicate timestamps"
            );
        }

        let sorted_index = keep.iter().map(|&i| index[i]).collect();
        let sorted_columns = columns
            .into_iter()
            .map(|(name, values)| (name, keep.iter().map(|&i| values[i]).collect()))
            .collect();

        Ok(Self {
            index: sorted_index,
            columns: sorted_columns,
        })
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Values of a column, if present.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
