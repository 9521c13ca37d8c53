//! Draw options and per-trace styling.

use crate::charts::figure::{CandleSide, LineStyle, Marker};

/// How the sub-panel draws its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubChart {
    #[default]
    Bar,
    Line,
}

/// Draw mode of scatter-family main panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScatterMode {
    /// Connected line.
    #[default]
    Lines,
    /// Filled area to zero, no line.
    Area,
    /// Discrete markers.
    Markers,
}

impl ScatterMode {
    /// Plotly `mode` value.
    pub fn mode(self) -> &'static str {
        match self {
            ScatterMode::Lines => "lines",
            ScatterMode::Area => "none",
            ScatterMode::Markers => "markers",
        }
    }

    /// Plotly `fill` value.
    pub fn fill(self) -> Option<&'static str> {
        match self {
            ScatterMode::Area => Some("tozeroy"),
            _ => None,
        }
    }
}

/// Optional styling applied to main-panel and indicator traces.
///
/// Unset fields leave plotly defaults in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceStyle {
    pub opacity: Option<f64>,
    pub line_width: Option<f64>,
    /// Plotly dash name, e.g. `dot` or `dash`.
    pub line_dash: Option<String>,
    pub marker_size: Option<f64>,
    /// Overrides the fill implied by the draw mode.
    pub fill: Option<String>,
    pub connect_gaps: Option<bool>,
    pub show_legend: Option<bool>,
    /// Candlestick body and wick color for rising bars.
    pub increasing_color: Option<String>,
    /// Candlestick body and wick color for falling bars.
    pub decreasing_color: Option<String>,
}

impl TraceStyle {
    pub(crate) fn line(&self) -> Option<LineStyle> {
        LineStyle {
            color: None,
            width: self.line_width,
            dash: self.line_dash.clone(),
        }
        .non_empty()
    }

    pub(crate) fn marker(&self) -> Option<Marker> {
        self.marker_size.map(|size| Marker {
            color: None,
            size: Some(size),
        })
    }

    pub(crate) fn increasing(&self) -> Option<CandleSide> {
        self.increasing_color
            .as_ref()
            .map(|c| self.candle_side(c))
    }

    pub(crate) fn decreasing(&self) -> Option<CandleSide> {
        self.decreasing_color
            .as_ref()
            .map(|c| self.candle_side(c))
    }

    fn candle_side(&self, color: &str) -> CandleSide {
        CandleSide {
            line: LineStyle {
                color: Some(color.to_string()),
                width: self.line_width,
                dash: None,
            },
            fillcolor: color.to_string(),
        }
    }
}

/// Options shared by all draw operations.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
    /// Keep pan/zoom state stable across data refreshes.
    pub keep_ui_state: bool,
    pub sub_chart: SubChart,
    pub style: TraceStyle,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            title: None,
            keep_ui_state: true,
            sub_chart: SubChart::default(),
            style: TraceStyle::default(),
        }
    }
}

impl DrawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn keep_ui_state(mut self, keep: bool) -> Self {
        self.keep_ui_state = keep;
        self
    }

    pub fn sub_chart(mut self, sub_chart: SubChart) -> Self {
        self.sub_chart = sub_chart;
        self
    }

    pub fn style(mut self, style: TraceStyle) -> Self {
        self.style = style;
        self
    }
}
