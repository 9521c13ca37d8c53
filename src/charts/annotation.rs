//! Annotation table to layout annotations.

use crate::charts::figure::Annotation;
use crate::data::AnnotationTable;

pub const DEFAULT_ANNOTATION_COLOR: &str = "#ec0000";

/// Round to two decimals from the exact binary value, so `0.015` (stored
/// just below) goes down and `0.025` (stored just above) goes up.
fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// One arrow marker per row, in entity order.
pub fn to_annotations(table: Option<&AnnotationTable>) -> Vec<Annotation> {
    let Some(table) = table else {
        return Vec::new();
    };

    table
        .rows()
        .iter()
        .map(|row| Annotation {
            x: row.timestamp,
            y: round2(row.value),
            xref: "x".into(),
            yref: "y".into(),
            text: row.flag.clone(),
            showarrow: true,
            align: "center".into(),
            arrowhead: 2,
            arrowsize: 1.0,
            arrowwidth: 2.0,
            ax: -10,
            ay: -30,
            bordercolor: "#c7c7c7".into(),
            borderwidth: 1,
            bgcolor: row
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_ANNOTATION_COLOR.to_string()),
            opacity: 0.8,
        })
        .collect()
}
