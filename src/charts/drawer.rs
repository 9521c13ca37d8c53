//! Chart drawer: entity-keyed data groups to a composite figure.
//!
//! A [`Drawer`] holds a main data group, any number of indicator groups
//! drawn as lines over the main panel, an optional sub-panel group drawn on a
//! second y-axis beneath it, highlight rectangles and annotation markers.
//! Every draw builds a fresh [`Figure`]; the inputs are never modified.

use crate::charts::annotation::to_annotations;
use crate::charts::figure::{
    Bar, Candlestick, ColorSpec, Figure, Fill, Font, Layout, LineStyle, Marker, Scatter, Shape,
    Table, TableCells, TableHeader, Trace, SUB_Y_AXIS,
};
use crate::charts::layout::{gen_layout, LayoutParams};
use crate::charts::style::{DrawOptions, ScatterMode, SubChart, TraceStyle};
use crate::config::DrawerConfig;
use crate::data::{display_code, AnnotationTable, EntityFrame, NormalData};
use crate::error::DrawerError;
use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use std::path::PathBuf;

pub const UP_COLOR: &str = "red";
pub const DOWN_COLOR: &str = "green";

const RECT_LINE_COLOR: &str = "RoyalBlue";
const RECT_FILL_COLOR: &str = "LightSkyBlue";

const TABLE_INDEX_HEADER_COLOR: &str = "#000080";
const TABLE_COLUMN_HEADER_COLOR: &str = "#0066cc";
const TABLE_CELL_COLOR: &str = "#F5F8FF";
// Fraction digits only appear when the timestamp has them.
const TABLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Highlight region on the main panel, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: NaiveDateTime,
    pub y0: f64,
    pub x1: NaiveDateTime,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: NaiveDateTime, y0: f64, x1: NaiveDateTime, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    fn to_shape(self) -> Shape {
        Shape {
            kind: "rect".into(),
            x0: self.x0,
            y0: self.y0,
            x1: self.x1,
            y1: self.y1,
            xref: "x".into(),
            yref: "y".into(),
            line: LineStyle {
                color: Some(RECT_LINE_COLOR.into()),
                width: Some(2.0),
                dash: None,
            },
            fillcolor: RECT_FILL_COLOR.into(),
        }
    }
}

/// What the main panel draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChart {
    Kline,
    Scatter(ScatterMode),
}

/// Sub-panel color for one value: up only when strictly positive.
pub fn sub_color(value: Option<f64>) -> &'static str {
    match value {
        Some(v) if v > 0.0 => UP_COLOR,
        _ => DOWN_COLOR,
    }
}

/// Input for one data group: a raw long table or an already wrapped group.
#[derive(Debug, Clone)]
enum DataInput {
    Frame(DataFrame),
    Normal(NormalData),
}

impl DataInput {
    fn normalize(self) -> Result<NormalData, DrawerError> {
        match self {
            DataInput::Frame(df) => Ok(NormalData::from_df(&df)?),
            DataInput::Normal(data) => Ok(data),
        }
    }
}

#[derive(Debug, Clone)]
enum AnnotationInput {
    Frame(DataFrame),
    Table(AnnotationTable),
}

/// Builder for [`Drawer`]. For each group the last supplied form wins.
#[derive(Debug, Clone, Default)]
pub struct DrawerBuilder {
    main: Option<DataInput>,
    factors: Vec<DataInput>,
    sub: Option<DataInput>,
    rects: Vec<Rect>,
    annotations: Option<AnnotationInput>,
}

impl DrawerBuilder {
    pub fn main_df(mut self, df: DataFrame) -> Self {
        self.main = Some(DataInput::Frame(df));
        self
    }

    pub fn main_data(mut self, data: NormalData) -> Self {
        self.main = Some(DataInput::Normal(data));
        self
    }

    /// Add an indicator group drawn as lines over the main panel.
    pub fn factor_df(mut self, df: DataFrame) -> Self {
        self.factors.push(DataInput::Frame(df));
        self
    }

    pub fn factor_data(mut self, data: NormalData) -> Self {
        self.factors.push(DataInput::Normal(data));
        self
    }

    pub fn sub_df(mut self, df: DataFrame) -> Self {
        self.sub = Some(DataInput::Frame(df));
        self
    }

    pub fn sub_data(mut self, data: NormalData) -> Self {
        self.sub = Some(DataInput::Normal(data));
        self
    }

    pub fn rect(mut self, rect: Rect) -> Self {
        self.rects.push(rect);
        self
    }

    pub fn rects(mut self, rects: impl IntoIterator<Item = Rect>) -> Self {
        self.rects.extend(rects);
        self
    }

    pub fn annotation_df(mut self, df: DataFrame) -> Self {
        self.annotations = Some(AnnotationInput::Frame(df));
        self
    }

    pub fn annotations(mut self, table: AnnotationTable) -> Self {
        self.annotations = Some(AnnotationInput::Table(table));
        self
    }

    /// Normalize every raw table once. Only a malformed main table is an
    /// error; a malformed optional group is logged and drawn as empty.
    pub fn build(self) -> Result<Drawer, DrawerError> {
        let main_data = match self.main {
            Some(input) => input.normalize()?,
            None => NormalData::default(),
        };
        let factor_data_list = self
            .factors
            .into_iter()
            .filter_map(|input| optional_group("factor", input.normalize()))
            .collect();
        let sub_data = self
            .sub
            .and_then(|input| optional_group("sub", input.normalize()))
            .unwrap_or_default();
        let annotations = match self.annotations {
            Some(AnnotationInput::Frame(df)) => optional_group(
                "annotation",
                AnnotationTable::from_df(&df).map_err(DrawerError::from),
            ),
            Some(AnnotationInput::Table(table)) => Some(table),
            None => None,
        };

        Ok(Drawer {
            main_data,
            factor_data_list,
            sub_data,
            rects: self.rects,
            annotations,
        })
    }
}

fn optional_group<T>(group: &str, result: Result<T, DrawerError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(group, error = %e, "skipping malformed data group");
            None
        }
    }
}

/// Renders entity-keyed groups into figures.
#[derive(Debug, Clone, Default)]
pub struct Drawer {
    main_data: NormalData,
    factor_data_list: Vec<NormalData>,
    sub_data: NormalData,
    rects: Vec<Rect>,
    annotations: Option<AnnotationTable>,
}

impl Drawer {
    pub fn builder() -> DrawerBuilder {
        DrawerBuilder::default()
    }

    /// Drawer over an already wrapped main group.
    pub fn new(main_data: NormalData) -> Self {
        Self {
            main_data,
            ..Default::default()
        }
    }

    /// Drawer over a raw (`entity_id`, `timestamp`) table.
    pub fn from_df(main_df: &DataFrame) -> Result<Self, DrawerError> {
        Ok(Self::new(NormalData::from_df(main_df)?))
    }

    pub fn main_data(&self) -> &NormalData {
        &self.main_data
    }

    pub fn draw_kline(&self, opts: &DrawOptions) -> Figure {
        self.draw(MainChart::Kline, opts)
    }

    pub fn draw_line(&self, opts: &DrawOptions) -> Figure {
        self.draw_scatter(ScatterMode::Lines, opts)
    }

    pub fn draw_area(&self, opts: &DrawOptions) -> Figure {
        self.draw_scatter(ScatterMode::Area, opts)
    }

    pub fn draw_scatter(&self, mode: ScatterMode, opts: &DrawOptions) -> Figure {
        self.draw(MainChart::Scatter(mode), opts)
    }

    pub fn show_kline(
        &self,
        opts: &DrawOptions,
        config: &DrawerConfig,
    ) -> Result<PathBuf, DrawerError> {
        self.draw_kline(opts).show(config, None)
    }

    pub fn show_line(
        &self,
        opts: &DrawOptions,
        config: &DrawerConfig,
    ) -> Result<PathBuf, DrawerError> {
        self.draw_line(opts).show(config, None)
    }

    pub fn show_area(
        &self,
        opts: &DrawOptions,
        config: &DrawerConfig,
    ) -> Result<PathBuf, DrawerError> {
        self.draw_area(opts).show(config, None)
    }

    pub fn show_scatter(
        &self,
        mode: ScatterMode,
        opts: &DrawOptions,
        config: &DrawerConfig,
    ) -> Result<PathBuf, DrawerError> {
        self.draw_scatter(mode, opts).show(config, None)
    }

    /// Show the main group as a table of (entity_id, timestamp, columns...).
    pub fn show_table(
        &self,
        opts: &DrawOptions,
        config: &DrawerConfig,
    ) -> Result<PathBuf, DrawerError> {
        self.table_figure(opts).show(config, None)
    }

    /// Build the composite figure for `main`.
    pub fn draw(&self, main: MainChart, opts: &DrawOptions) -> Figure {
        let subplot = !self.sub_data.is_empty();
        let factor_mode = match main {
            MainChart::Kline => ScatterMode::Lines,
            MainChart::Scatter(mode) => mode,
        };

        let mut traces = Vec::new();
        let mut sub_traces = Vec::new();

        for (entity_id, df) in self.main_data.iter() {
            if df.is_empty() {
                tracing::debug!(entity_id, "skipping entity without rows");
                continue;
            }
            let code = display_code(entity_id);

            match main {
                MainChart::Kline => match candlestick(&code, df, &opts.style) {
                    Some(trace) => traces.push(trace),
                    None => tracing::warn!(entity_id, "missing open/high/low/close, no kline drawn"),
                },
                MainChart::Scatter(mode) => {
                    traces.extend(scatter_traces(&code, df, mode, &opts.style));
                }
            }

            for factor_data in &self.factor_data_list {
                if let Some(factor_df) = factor_data.get(entity_id).filter(|f| !f.is_empty()) {
                    traces.extend(scatter_traces(&code, factor_df, factor_mode, &opts.style));
                }
            }

            if subplot {
                if let Some(sub_df) = self.sub_data.get(entity_id).filter(|f| !f.is_empty()) {
                    sub_traces.extend(sub_panel_traces(&code, sub_df, opts.sub_chart));
                }
            }
        }

        tracing::debug!(
            main = traces.len(),
            sub = sub_traces.len(),
            "built traces"
        );

        let mut layout = self.layout(opts, subplot);
        layout.shapes = self.rects.iter().map(|r| r.to_shape()).collect();

        traces.extend(sub_traces);
        Figure::new(traces, layout)
    }

    pub(crate) fn table_figure(&self, opts: &DrawOptions) -> Figure {
        let columns = self.main_data.columns();
        let rows = self.main_data.table_rows();

        let mut header = vec!["entity_id".to_string(), "timestamp".to_string()];
        header.extend(columns.iter().cloned());

        let mut header_colors = vec![TABLE_INDEX_HEADER_COLOR.to_string(); 2];
        header_colors.extend(std::iter::repeat(TABLE_COLUMN_HEADER_COLOR.to_string()).take(columns.len()));

        let mut values: Vec<Vec<serde_json::Value>> = vec![
            rows.iter().map(|r| r.entity_id.clone().into()).collect(),
            rows.iter()
                .map(|r| r.timestamp.format(TABLE_TIME_FORMAT).to_string().into())
                .collect(),
        ];
        for i in 0..columns.len() {
            values.push(
                rows.iter()
                    .map(|r| r.values[i].map(serde_json::Value::from).unwrap_or_default())
                    .collect(),
            );
        }

        let table = Trace::Table(Table {
            header: TableHeader {
                values: header,
                fill: Fill {
                    color: ColorSpec::PerPoint(header_colors),
                },
                align: "left".into(),
                font: Font {
                    color: "white".into(),
                    size: 13,
                },
            },
            cells: TableCells {
                values,
                fill: Fill {
                    color: ColorSpec::Single(TABLE_CELL_COLOR.into()),
                },
                align: "left".into(),
            },
        });

        Figure::new(vec![table], self.layout(opts, false))
    }

    fn layout(&self, opts: &DrawOptions, subplot: bool) -> Layout {
        let mut layout = gen_layout(&LayoutParams {
            width: opts.width,
            height: opts.height,
            title: opts.title.as_deref(),
            keep_ui_state: opts.keep_ui_state,
            subplot,
        });
        layout.annotations = to_annotations(self.annotations.as_ref());
        layout
    }
}

fn candlestick(code: &str, df: &EntityFrame, style: &TraceStyle) -> Option<Trace> {
    Some(Trace::Candlestick(Candlestick {
        name: format!("{code}_kdata"),
        x: df.index().to_vec(),
        open: df.column("open")?.to_vec(),
        high: df.column("high")?.to_vec(),
        low: df.column("low")?.to_vec(),
        close: df.column("close")?.to_vec(),
        yaxis: None,
        opacity: style.opacity,
        showlegend: style.show_legend,
        increasing: style.increasing(),
        decreasing: style.decreasing(),
    }))
}

/// One scatter trace per column, named `{code}_{column}`.
fn scatter_traces(
    code: &str,
    df: &EntityFrame,
    mode: ScatterMode,
    style: &TraceStyle,
) -> Vec<Trace> {
    df.columns()
        .map(|(column, values)| {
            Trace::Scatter(Scatter {
                name: format!("{code}_{column}"),
                x: df.index().to_vec(),
                y: values.to_vec(),
                mode: mode.mode().into(),
                fill: style
                    .fill
                    .clone()
                    .or_else(|| mode.fill().map(String::from)),
                yaxis: None,
                line: style.line(),
                marker: style.marker(),
                opacity: style.opacity,
                connectgaps: style.connect_gaps,
                showlegend: style.show_legend,
            })
        })
        .collect()
}

fn sub_panel_traces(code: &str, df: &EntityFrame, sub_chart: SubChart) -> Vec<Trace> {
    df.columns()
        .map(|(column, values)| {
            let name = format!("{code}_{column}");
            let marker = Some(Marker {
                color: Some(ColorSpec::PerPoint(
                    values.iter().map(|v| sub_color(*v).to_string()).collect(),
                )),
                size: None,
            });

            match sub_chart {
                SubChart::Bar => Trace::Bar(Bar {
                    name,
                    x: df.index().to_vec(),
                    y: values.to_vec(),
                    yaxis: Some(SUB_Y_AXIS.into()),
                    marker,
                }),
                SubChart::Line => Trace::Scatter(Scatter {
                    name,
                    x: df.index().to_vec(),
                    y: values.to_vec(),
                    mode: "lines+markers".into(),
                    fill: None,
                    yaxis: Some(SUB_Y_AXIS.into()),
                    line: None,
                    marker,
                    opacity: None,
                    connectgaps: None,
                    showlegend: None,
                }),
            }
        })
        .collect()
}

/// Types that know how to describe themselves as drawer inputs.
///
/// Every hook defaults to `None`; implementors override the ones they have.
pub trait Drawable {
    fn drawer_main_df(&self) -> Option<DataFrame> {
        None
    }

    fn drawer_main_data(&self) -> Option<NormalData> {
        None
    }

    fn drawer_factor_df_list(&self) -> Option<Vec<DataFrame>> {
        None
    }

    fn drawer_factor_data_list(&self) -> Option<Vec<NormalData>> {
        None
    }

    fn drawer_sub_df(&self) -> Option<DataFrame> {
        None
    }

    fn drawer_sub_data(&self) -> Option<NormalData> {
        None
    }

    fn drawer_annotation_df(&self) -> Option<DataFrame> {
        None
    }

    fn drawer_rects(&self) -> Option<Vec<Rect>> {
        None
    }

    /// Assemble a [`Drawer`]; wrapped data takes precedence over raw tables.
    fn drawer(&self) -> Result<Drawer, DrawerError> {
        let mut builder = Drawer::builder();

        if let Some(df) = self.drawer_main_df() {
            builder = builder.main_df(df);
        }
        if let Some(data) = self.drawer_main_data() {
            builder = builder.main_data(data);
        }

        match self.drawer_factor_data_list().filter(|l| !l.is_empty()) {
            Some(list) => {
                for data in list {
                    builder = builder.factor_data(data);
                }
            }
            None => {
                for df in self.drawer_factor_df_list().unwrap_or_default() {
                    builder = builder.factor_df(df);
                }
            }
        }

        if let Some(df) = self.drawer_sub_df() {
            builder = builder.sub_df(df);
        }
        if let Some(data) = self.drawer_sub_data() {
            builder = builder.sub_data(data);
        }
        if let Some(df) = self.drawer_annotation_df() {
            builder = builder.annotation_df(df);
        }
        if let Some(rects) = self.drawer_rects() {
            builder = builder.rects(rects);
        }

        builder.build()
    }

    /// Draw as a kline chart.
    fn draw(&self, opts: &DrawOptions) -> Result<Figure, DrawerError> {
        Ok(self.drawer()?.draw_kline(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AnnotationRow;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn frame(columns: &[(&str, [f64; 3])]) -> EntityFrame {
        EntityFrame::new(
            vec![day(2), day(3), day(4)],
            columns
                .iter()
                .map(|(name, values)| (name.to_string(), values.iter().map(|v| Some(*v)).collect()))
                .collect(),
        )
        .unwrap()
    }

    fn kdata() -> NormalData {
        let ohlc = [
            ("open", [1.0, 2.0, 3.0]),
            ("high", [2.0, 3.0, 4.0]),
            ("low", [0.5, 1.5, 2.5]),
            ("close", [1.5, 2.5, 3.5]),
        ];
        NormalData::from_entity_map([
            ("stock_sz_000338", frame(&ohlc)),
            ("stock_sh_600000", frame(&ohlc)),
        ])
    }

    fn names(figure: &Figure) -> Vec<&str> {
        figure.traces().iter().filter_map(|t| t.name()).collect()
    }

    #[test]
    fn kline_draws_one_candlestick_per_entity() {
        let figure = Drawer::new(kdata()).draw_kline(&DrawOptions::default());

        assert_eq!(names(&figure), vec!["600000_kdata", "000338_kdata"]);
        assert!(figure
            .traces()
            .iter()
            .all(|t| matches!(t, Trace::Candlestick(_))));
        assert!(!figure.has_sub_panel());
    }

    #[test]
    fn scatter_draws_one_trace_per_entity_column() {
        let figure = Drawer::new(kdata()).draw_line(&DrawOptions::default());

        assert_eq!(figure.traces().len(), 8);
        assert!(names(&figure).contains(&"000338_close"));
        match &figure.traces()[0] {
            Trace::Scatter(s) => assert_eq!(s.mode, "lines"),
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn area_and_markers_modes() {
        let drawer = Drawer::new(kdata());

        let Trace::Scatter(area) = &drawer.draw_area(&DrawOptions::default()).data[0] else {
            panic!("expected scatter");
        };
        assert_eq!(area.mode, "none");
        assert_eq!(area.fill.as_deref(), Some("tozeroy"));

        let markers = drawer.draw_scatter(ScatterMode::Markers, &DrawOptions::default());
        let Trace::Scatter(first) = &markers.data[0] else {
            panic!("expected scatter");
        };
        assert_eq!(first.mode, "markers");
    }

    #[test]
    fn factors_overlay_main_panel() {
        let ma = NormalData::from_entity_map([(
            "stock_sz_000338",
            frame(&[("ma5", [1.0, 1.1, 1.2]), ("ma10", [0.9, 1.0, 1.1])]),
        )]);
        let drawer = Drawer::builder()
            .main_data(kdata())
            .factor_data(ma)
            .build()
            .unwrap();

        let figure = drawer.draw_kline(&DrawOptions::default());
        assert_eq!(
            names(&figure),
            vec!["600000_kdata", "000338_kdata", "000338_ma5", "000338_ma10"]
        );
        assert!(figure.traces().iter().all(|t| !t.is_sub_panel()));
    }

    #[test]
    fn sub_panel_colors_by_sign() {
        let sub = NormalData::from_entity_map([(
            "stock_sz_000338",
            frame(&[("slope", [1.5, 0.0, -2.0])]),
        )]);
        let drawer = Drawer::builder()
            .main_data(kdata())
            .sub_data(sub)
            .build()
            .unwrap();

        let figure = drawer.draw_kline(&DrawOptions::default());
        assert!(figure.has_sub_panel());

        let Some(Trace::Bar(bar)) = figure.traces().last() else {
            panic!("expected a sub-panel bar");
        };
        assert_eq!(bar.name, "000338_slope");
        assert_eq!(bar.yaxis.as_deref(), Some("y2"));
        let colors = bar.marker.as_ref().and_then(|m| m.color.clone());
        assert_eq!(
            colors,
            Some(ColorSpec::PerPoint(vec![
                "red".into(),
                "green".into(),
                "green".into()
            ]))
        );
    }

    #[test]
    fn sub_panel_line_mode() {
        let sub = NormalData::from_entity_map([(
            "stock_sz_000338",
            frame(&[("slope", [1.0, -1.0, 1.0])]),
        )]);
        let drawer = Drawer::builder()
            .main_data(kdata())
            .sub_data(sub)
            .build()
            .unwrap();

        let figure = drawer.draw_kline(&DrawOptions::new().sub_chart(SubChart::Line));
        let Some(Trace::Scatter(line)) = figure.traces().last() else {
            panic!("expected a sub-panel line");
        };
        assert_eq!(line.yaxis.as_deref(), Some("y2"));
    }

    #[test]
    fn missing_or_nan_sub_values_are_down() {
        assert_eq!(sub_color(None), DOWN_COLOR);
        assert_eq!(sub_color(Some(f64::NAN)), DOWN_COLOR);
        assert_eq!(sub_color(Some(0.0)), DOWN_COLOR);
        assert_eq!(sub_color(Some(1e-9)), UP_COLOR);
    }

    #[test]
    fn entity_without_ohlc_is_skipped() {
        let main = NormalData::from_entity_map([
            ("stock_sz_000338", frame(&[("close", [1.0, 2.0, 3.0])])),
            (
                "stock_sh_600000",
                frame(&[
                    ("open", [1.0, 2.0, 3.0]),
                    ("high", [1.0, 2.0, 3.0]),
                    ("low", [1.0, 2.0, 3.0]),
                    ("close", [1.0, 2.0, 3.0]),
                ]),
            ),
            ("stock_sz_000001", EntityFrame::default()),
        ]);

        let figure = Drawer::new(main).draw_kline(&DrawOptions::default());
        assert_eq!(names(&figure), vec!["600000_kdata"]);
    }

    #[test]
    fn undecodable_entity_uses_raw_id() {
        let main = NormalData::from_entity_map([("BTCUSDT", frame(&[("close", [1.0, 2.0, 3.0])]))]);
        let figure = Drawer::new(main).draw_line(&DrawOptions::default());
        assert_eq!(names(&figure), vec!["BTCUSDT_close"]);
    }

    #[test]
    fn rects_become_shapes() {
        let drawer = Drawer::builder()
            .main_data(kdata())
            .rect(Rect::new(day(2), 1.0, day(3), 2.0))
            .build()
            .unwrap();

        let figure = drawer.draw_kline(&DrawOptions::default());
        let shape = &figure.layout.shapes[0];
        assert_eq!(shape.kind, "rect");
        assert_eq!(shape.line.color.as_deref(), Some("RoyalBlue"));
        assert_eq!(shape.fillcolor, "LightSkyBlue");
        assert_eq!((shape.xref.as_str(), shape.yref.as_str()), ("x", "y"));
    }

    #[test]
    fn annotations_land_in_layout() {
        let drawer = Drawer::builder()
            .main_data(kdata())
            .annotations(AnnotationTable::from_rows(vec![AnnotationRow {
                entity_id: "stock_sz_000338".into(),
                timestamp: day(3),
                value: 2.456,
                flag: "buy".into(),
                color: None,
            }]))
            .build()
            .unwrap();

        let figure = drawer.draw_kline(&DrawOptions::default());
        assert_eq!(figure.layout.annotations.len(), 1);
        assert_eq!(figure.layout.annotations[0].y, 2.46);
    }

    #[test]
    fn ui_state_only_changes_layout_flag() {
        let drawer = Drawer::new(kdata());
        let kept = drawer.draw_kline(&DrawOptions::default());
        let reset = drawer.draw_kline(&DrawOptions::default().keep_ui_state(false));

        assert_eq!(kept.data, reset.data);
        assert_eq!(kept.layout.uirevision, Some(true));
        assert_eq!(reset.layout.uirevision, None);

        let mut relaxed = reset.layout.clone();
        relaxed.uirevision = Some(true);
        assert_eq!(relaxed, kept.layout);
    }

    #[test]
    fn style_applies_to_main_and_factor_traces() {
        let style = TraceStyle {
            opacity: Some(0.5),
            line_width: Some(3.0),
            ..Default::default()
        };
        let figure = Drawer::new(kdata()).draw_line(&DrawOptions::new().style(style));

        for trace in figure.traces() {
            let Trace::Scatter(s) = trace else {
                panic!("expected scatter");
            };
            assert_eq!(s.opacity, Some(0.5));
            assert_eq!(s.line.as_ref().and_then(|l| l.width), Some(3.0));
        }
    }

    #[test]
    fn table_flattens_index_and_columns() {
        let figure = Drawer::new(kdata()).table_figure(&DrawOptions::default());
        let Trace::Table(table) = &figure.data[0] else {
            panic!("expected table");
        };

        assert_eq!(
            table.header.values,
            vec!["entity_id", "timestamp", "open", "high", "low", "close"]
        );
        assert_eq!(
            table.header.fill.color,
            ColorSpec::PerPoint(vec![
                "#000080".into(),
                "#000080".into(),
                "#0066cc".into(),
                "#0066cc".into(),
                "#0066cc".into(),
                "#0066cc".into()
            ])
        );
        assert_eq!(table.cells.values.len(), 6);
        assert_eq!(table.cells.values[0].len(), 6);
        assert_eq!(table.cells.values[0][0], "stock_sh_600000");
        assert_eq!(table.cells.values[1][0], "2024-01-02 00:00:00");
        assert_eq!(table.cells.values[2][0], 1.0);
        assert_eq!(table.header.font.size, 13);
    }

    #[test]
    fn table_keeps_fractional_seconds() {
        let ts = day(2) + chrono::Duration::milliseconds(250);
        let main = NormalData::from_entity_map([(
            "stock_sz_000338",
            EntityFrame::new(vec![day(2), ts], vec![("close".into(), vec![Some(1.0), Some(2.0)])])
                .unwrap(),
        )]);

        let figure = Drawer::new(main).table_figure(&DrawOptions::default());
        let Trace::Table(table) = &figure.data[0] else {
            panic!("expected table");
        };
        assert_eq!(table.cells.values[1][0], "2024-01-02 00:00:00");
        assert_eq!(table.cells.values[1][1], "2024-01-02 00:00:00.250");
    }

    #[test]
    fn malformed_optional_groups_are_dropped() {
        let no_timestamp = polars::df!(
            "entity_id" => ["stock_sz_000338"],
            "ma5" => [1.0]
        )
        .unwrap();

        let drawer = Drawer::builder()
            .main_data(kdata())
            .factor_df(no_timestamp.clone())
            .sub_df(no_timestamp.clone())
            .annotation_df(no_timestamp)
            .build()
            .unwrap();

        let figure = drawer.draw_kline(&DrawOptions::default());
        assert_eq!(names(&figure), vec!["600000_kdata", "000338_kdata"]);
        assert!(!figure.has_sub_panel());
        assert!(figure.layout.annotations.is_empty());
    }

    struct MaStats {
        kdata: NormalData,
        slope: NormalData,
    }

    impl Drawable for MaStats {
        fn drawer_main_data(&self) -> Option<NormalData> {
            Some(self.kdata.clone())
        }

        fn drawer_sub_data(&self) -> Option<NormalData> {
            Some(self.slope.clone())
        }
    }

    #[test]
    fn drawable_hooks_feed_kline() {
        let item = MaStats {
            kdata: kdata(),
            slope: NormalData::from_entity_map([(
                "stock_sz_000338",
                frame(&[("slope", [1.0, -1.0, 0.0])]),
            )]),
        };

        let figure = item.draw(&DrawOptions::default()).unwrap();
        assert!(figure.has_sub_panel());
        assert_eq!(figure.traces().len(), 3);
    }
}
