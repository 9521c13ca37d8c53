//! Plotly-compatible figure model.
//!
//! Every type serializes to the JSON shape plotly.js expects, so a
//! [`Figure`] can be embedded in a page, written as JSON, or rendered to a
//! static image by [`StaticChartRenderer`](crate::charts::StaticChartRenderer).

use crate::charts::{html, StaticChartRenderer};
use crate::config::DrawerConfig;
use crate::error::DrawerError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A single color or one color per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

impl LineStyle {
    fn is_empty(&self) -> bool {
        self.color.is_none() && self.width.is_none() && self.dash.is_none()
    }

    /// `None` when no field is set, so the key is left out of the JSON.
    pub(crate) fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// Styling for one direction of a candlestick trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleSide {
    pub line: LineStyle,
    pub fillcolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candlestick {
    pub name: String,
    pub x: Vec<NaiveDateTime>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increasing: Option<CandleSide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decreasing: Option<CandleSide>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub name: String,
    pub x: Vec<NaiveDateTime>,
    pub y: Vec<Option<f64>>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectgaps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub name: String,
    pub x: Vec<NaiveDateTime>,
    pub y: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub color: ColorSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableHeader {
    pub values: Vec<String>,
    pub fill: Fill,
    pub align: String,
    pub font: Font,
}

/// Table cells are column-major: one inner vector per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCells {
    pub values: Vec<Vec<serde_json::Value>>,
    pub fill: Fill,
    pub align: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub header: TableHeader,
    pub cells: TableCells,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick(Candlestick),
    Scatter(Scatter),
    Bar(Bar),
    Table(Table),
}

impl Trace {
    pub fn name(&self) -> Option<&str> {
        match self {
            Trace::Candlestick(t) => Some(t.name.as_str()),
            Trace::Scatter(t) => Some(t.name.as_str()),
            Trace::Bar(t) => Some(t.name.as_str()),
            Trace::Table(_) => None,
        }
    }

    /// Y axis the trace is bound to; `None` means the primary axis.
    pub fn yaxis(&self) -> Option<&str> {
        match self {
            Trace::Candlestick(t) => t.yaxis.as_deref(),
            Trace::Scatter(t) => t.yaxis.as_deref(),
            Trace::Bar(t) => t.yaxis.as_deref(),
            Trace::Table(_) => None,
        }
    }

    pub fn is_sub_panel(&self) -> bool {
        self.yaxis() == Some(SUB_Y_AXIS)
    }
}

/// Axis id used by sub-panel traces.
pub const SUB_Y_AXIS: &str = "y2";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixedrange: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linecolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showspikes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikethickness: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikedash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikecolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spikemode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub orientation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

/// Labeled arrow anchored at a data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub x: NaiveDateTime,
    pub y: f64,
    pub xref: String,
    pub yref: String,
    pub text: String,
    pub showarrow: bool,
    pub align: String,
    pub arrowhead: u8,
    pub arrowsize: f64,
    pub arrowwidth: f64,
    pub ax: i32,
    pub ay: i32,
    pub bordercolor: String,
    pub borderwidth: u32,
    pub bgcolor: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
    pub x0: NaiveDateTime,
    pub y0: f64,
    pub x1: NaiveDateTime,
    pub y1: f64,
    pub xref: String,
    pub yref: String,
    pub line: LineStyle,
    pub fillcolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub showlegend: bool,
    pub plot_bgcolor: String,
    pub hovermode: String,
    pub hoverdistance: u32,
    pub spikedistance: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uirevision: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis2: Option<Axis>,
    pub legend: Legend,
}

/// A complete figure: traces plus layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn new(data: Vec<Trace>, layout: Layout) -> Self {
        Self { data, layout }
    }

    pub fn traces(&self) -> &[Trace] {
        &self.data
    }

    /// True when a secondary panel is declared.
    pub fn has_sub_panel(&self) -> bool {
        self.layout.yaxis2.is_some()
    }

    pub fn to_json(&self) -> Result<String, DrawerError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value, DrawerError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Write the figure, choosing the format from the file extension.
    ///
    /// `html` and `json` keep the interactive model; `png` and `svg` are
    /// static renders.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DrawerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "html" => html::write_html(self, path, html::DEFAULT_PLOTLY_JS)?,
            "json" => fs::write(path, serde_json::to_vec_pretty(self)?)?,
            "png" | "svg" => StaticChartRenderer::render(self, path)?,
            other => return Err(DrawerError::UnsupportedFormat(other.to_string())),
        }

        tracing::info!(path = %path.display(), traces = self.data.len(), "saved figure");
        Ok(())
    }

    /// Write the figure as HTML into the UI directory and open it.
    ///
    /// Returns the written path. A browser that fails to open is logged, not
    /// reported as an error.
    pub fn show(&self, config: &DrawerConfig, name: Option<&str>) -> Result<PathBuf, DrawerError> {
        let path = config.ui_path(name, "html");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        html::write_html(self, &path, &config.plotly_js)?;
        tracing::info!(path = %path.display(), "wrote figure page");

        if config.open_browser {
            if let Err(e) = open::that(&path) {
                tracing::warn!(path = %path.display(), error = %e, "could not open figure page");
            }
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn traces_are_tagged_with_plotly_type() {
        let trace = Trace::Bar(Bar {
            name: "000338_slope".into(),
            x: vec![ts()],
            y: vec![Some(1.0)],
            yaxis: Some(SUB_Y_AXIS.into()),
            marker: Some(Marker {
                color: Some(ColorSpec::PerPoint(vec!["red".into()])),
                size: None,
            }),
        });

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["type"], "bar");
        assert_eq!(json["yaxis"], "y2");
        assert_eq!(json["marker"]["color"][0], "red");
        assert!(json["marker"].get("size").is_none());
        assert_eq!(json["x"][0], "2024-01-02T00:00:00");
        assert!(trace.is_sub_panel());
    }

    #[test]
    fn missing_values_serialize_as_null() {
        let trace = Trace::Scatter(Scatter {
            name: "a_ma5".into(),
            x: vec![ts(), ts()],
            y: vec![None, Some(2.5)],
            mode: "lines".into(),
            fill: None,
            yaxis: None,
            line: None,
            marker: None,
            opacity: None,
            connectgaps: None,
            showlegend: None,
        });

        let json = serde_json::to_value(&trace).unwrap();
        assert!(json["y"][0].is_null());
        assert_eq!(json["y"][1], 2.5);
        assert!(json.get("fill").is_none());
    }

    #[test]
    fn empty_line_style_is_dropped() {
        assert_eq!(LineStyle::default().non_empty(), None);
        let styled = LineStyle {
            width: Some(2.0),
            ..Default::default()
        };
        assert_eq!(styled.clone().non_empty(), Some(styled));
    }
}
