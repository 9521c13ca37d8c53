//! Static Chart Renderer
//! Renders a figure to PNG or SVG through plotters.
//!
//! Layout:
//! 1. Title centered on top (when set)
//! 2. Main panel: candlesticks, scatter lines/areas/markers, highlight
//!    rectangles and annotation labels, with a series legend
//! 3. Sub-panel (when `yaxis2` is declared): bars or lines colored per point,
//!    sharing the main panel's time axis

use crate::charts::figure::{ColorSpec, Figure, Scatter, Trace};
use crate::error::DrawerError;
use chrono::NaiveDateTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 800;

// Colors (RGB)
const UP: RGBColor = RGBColor(231, 76, 60);
const DOWN: RGBColor = RGBColor(46, 204, 113);
const ROYAL_BLUE: RGBColor = RGBColor(65, 105, 225);
const LIGHT_SKY_BLUE: RGBColor = RGBColor(135, 206, 250);
const AXIS_LINE: RGBColor = RGBColor(188, 204, 220);

/// Series palette, cycled per trace.
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(243, 156, 18),  // Orange
    RGBColor(155, 89, 182),  // Purple
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(255, 87, 34),   // Deep Orange
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
    RGBColor(46, 204, 113),  // Green
];

// Share of the drawing height given to the main panel when a sub-panel exists.
const MAIN_PANEL_PCT: u32 = 78;

fn render_err<E: std::fmt::Display>(e: E) -> DrawerError {
    DrawerError::Render(e.to_string())
}

/// Sorted, de-duplicated time axis shared by both panels.
struct TimeAxis {
    stamps: Vec<NaiveDateTime>,
}

impl TimeAxis {
    fn from_figure(figure: &Figure) -> Self {
        let mut stamps: Vec<NaiveDateTime> = Vec::new();
        for trace in &figure.data {
            match trace {
                Trace::Candlestick(t) => stamps.extend(&t.x),
                Trace::Scatter(t) => stamps.extend(&t.x),
                Trace::Bar(t) => stamps.extend(&t.x),
                Trace::Table(_) => {}
            }
        }
        for shape in &figure.layout.shapes {
            stamps.extend([shape.x0, shape.x1]);
        }
        stamps.extend(figure.layout.annotations.iter().map(|a| a.x));
        stamps.sort();
        stamps.dedup();
        Self { stamps }
    }

    fn pos(&self, ts: &NaiveDateTime) -> f64 {
        match self.stamps.binary_search(ts) {
            Ok(i) | Err(i) => i as f64,
        }
    }

    fn range(&self) -> std::ops::Range<f64> {
        -0.5..(self.stamps.len().max(1) as f64 - 0.5)
    }

    fn label(&self, x: f64) -> String {
        let i = x.round();
        if i < 0.0 || (i - x).abs() > 1e-6 {
            return String::new();
        }
        self.stamps
            .get(i as usize)
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Parse `#rrggbb`, `#rgb` or one of the named colors the drawer emits.
fn parse_color(text: &str) -> Option<RGBColor> {
    let named = match text.to_ascii_lowercase().as_str() {
        "red" => Some(UP),
        "green" => Some(DOWN),
        "royalblue" => Some(ROYAL_BLUE),
        "lightskyblue" => Some(LIGHT_SKY_BLUE),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    };
    if named.is_some() {
        return named;
    }

    let hex = text.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(RGBColor(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(RGBColor(short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

/// Padded value range; widened when flat so plotters has a non-empty range.
fn value_range(values: impl IntoIterator<Item = f64>, include_zero: bool) -> std::ops::Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if min.is_infinite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad)..(max + pad);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

fn finite_points(axis: &TimeAxis, x: &[NaiveDateTime], y: &[Option<f64>]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y)
        .filter_map(|(ts, v)| v.filter(|v| v.is_finite()).map(|v| (axis.pos(ts), v)))
        .collect()
}

fn point_colors(spec: Option<&ColorSpec>, n: usize, fallback: RGBColor) -> Vec<RGBColor> {
    match spec {
        Some(ColorSpec::PerPoint(colors)) => colors
            .iter()
            .map(|c| parse_color(c).unwrap_or(fallback))
            .collect(),
        Some(ColorSpec::Single(c)) => vec![parse_color(c).unwrap_or(fallback); n],
        None => vec![fallback; n],
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `figure` to `path`; SVG for `.svg`, PNG otherwise.
    pub fn render(figure: &Figure, path: &Path) -> Result<(), DrawerError> {
        let size = (
            figure.layout.width.unwrap_or(DEFAULT_WIDTH),
            figure.layout.height.unwrap_or(DEFAULT_HEIGHT),
        );

        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

        if is_svg {
            let root = SVGBackend::new(path, size).into_drawing_area();
            Self::draw(figure, root)
        } else {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            Self::draw(figure, root)
        }
    }

    fn draw<DB: DrawingBackend>(
        figure: &Figure,
        root: DrawingArea<DB, Shift>,
    ) -> Result<(), DrawerError> {
        root.fill(&WHITE).map_err(render_err)?;

        let area = match &figure.layout.title {
            Some(title) => root
                .titled(&title.text, ("sans-serif", 20))
                .map_err(render_err)?,
            None => root.clone(),
        };

        let axis = TimeAxis::from_figure(figure);

        if figure.has_sub_panel() {
            let (_, height) = area.dim_in_pixel();
            let (upper, lower) = area.split_vertically(height * MAIN_PANEL_PCT / 100);
            Self::draw_main_panel(figure, &axis, &upper, false)?;
            Self::draw_sub_panel(figure, &axis, &lower)?;
        } else {
            Self::draw_main_panel(figure, &axis, &area, true)?;
        }

        root.present().map_err(render_err)?;
        Ok(())
    }

    fn draw_main_panel<DB: DrawingBackend>(
        figure: &Figure,
        axis: &TimeAxis,
        area: &DrawingArea<DB, Shift>,
        with_x_labels: bool,
    ) -> Result<(), DrawerError> {
        let main_traces: Vec<&Trace> = figure.data.iter().filter(|t| !t.is_sub_panel()).collect();

        let mut values: Vec<f64> = Vec::new();
        for trace in &main_traces {
            match trace {
                Trace::Candlestick(t) => {
                    values.extend(t.low.iter().flatten());
                    values.extend(t.high.iter().flatten());
                }
                Trace::Scatter(t) => {
                    values.extend(t.y.iter().flatten());
                    if t.fill.is_some() {
                        values.push(0.0);
                    }
                }
                Trace::Bar(t) => values.extend(t.y.iter().flatten()),
                Trace::Table(_) => {}
            }
        }
        for shape in &figure.layout.shapes {
            values.extend([shape.y0, shape.y1]);
        }
        values.extend(figure.layout.annotations.iter().map(|a| a.y));

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(if with_x_labels { 30 } else { 0 })
            .y_label_area_size(60)
            .build_cartesian_2d(axis.range(), value_range(values, false))
            .map_err(render_err)?;

        let x_fmt = |x: &f64| axis.label(*x);
        chart
            .configure_mesh()
            .disable_mesh()
            .axis_style(AXIS_LINE)
            .x_labels(8)
            .x_label_formatter(&x_fmt)
            .y_labels(8)
            .draw()
            .map_err(render_err)?;

        for shape in &figure.layout.shapes {
            let line = shape
                .line
                .color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or(ROYAL_BLUE);
            let fill = parse_color(&shape.fillcolor).unwrap_or(LIGHT_SKY_BLUE);
            let corners = [
                (axis.pos(&shape.x0), shape.y0),
                (axis.pos(&shape.x1), shape.y1),
            ];
            chart
                .draw_series([
                    Rectangle::new(corners, fill.mix(0.4).filled()),
                    Rectangle::new(corners, line.stroke_width(2)),
                ])
                .map_err(render_err)?;
        }

        for (i, trace) in main_traces.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            match trace {
                Trace::Candlestick(t) => {
                    let candles = t.x.iter().enumerate().filter_map(|(j, ts)| {
                        let (o, h, l, c) = (t.open[j]?, t.high[j]?, t.low[j]?, t.close[j]?);
                        Some(CandleStick::new(
                            axis.pos(ts),
                            o,
                            h,
                            l,
                            c,
                            UP.filled(),
                            DOWN.filled(),
                            5,
                        ))
                    });
                    chart
                        .draw_series(candles)
                        .map_err(render_err)?
                        .label(t.name.clone())
                        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], UP.filled()));
                }
                Trace::Scatter(t) => Self::draw_scatter(&mut chart, axis, t, color)?,
                Trace::Bar(t) => {
                    let points = finite_points(axis, &t.x, &t.y);
                    chart
                        .draw_series(points.into_iter().map(|(x, y)| {
                            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], color.filled())
                        }))
                        .map_err(render_err)?
                        .label(t.name.clone())
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                        });
                }
                Trace::Table(_) => {}
            }
        }

        for annotation in &figure.layout.annotations {
            let bg = parse_color(&annotation.bgcolor).unwrap_or(UP);
            let at = (axis.pos(&annotation.x), annotation.y);
            chart
                .draw_series(std::iter::once(
                    EmptyElement::at(at)
                        + Circle::new((0, 0), 3, bg.filled())
                        + Text::new(
                            annotation.text.clone(),
                            (annotation.ax, annotation.ay),
                            ("sans-serif", 12).into_font().color(&bg),
                        ),
                ))
                .map_err(render_err)?;
        }

        if !main_traces.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(AXIS_LINE)
                .draw()
                .map_err(render_err)?;
        }

        Ok(())
    }

    fn draw_scatter<DB: DrawingBackend>(
        chart: &mut ChartContext<'_, DB, Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>>,
        axis: &TimeAxis,
        trace: &Scatter,
        color: RGBColor,
    ) -> Result<(), DrawerError> {
        let points = finite_points(axis, &trace.x, &trace.y);
        let width = trace
            .line
            .as_ref()
            .and_then(|l| l.width)
            .map(|w| w.round().max(1.0) as u32)
            .unwrap_or(2);

        let anno = if trace.fill.is_some() {
            chart
                .draw_series(AreaSeries::new(points, 0.0, color.mix(0.3)).border_style(color))
                .map_err(render_err)?
        } else if trace.mode == "markers" {
            let size = trace
                .marker
                .as_ref()
                .and_then(|m| m.size)
                .map(|s| (s / 2.0).round().max(1.0) as i32)
                .unwrap_or(3);
            chart
                .draw_series(
                    points
                        .into_iter()
                        .map(|p| Circle::new(p, size, color.filled())),
                )
                .map_err(render_err)?
        } else {
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(width)))
                .map_err(render_err)?
        };

        anno.label(trace.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        Ok(())
    }

    fn draw_sub_panel<DB: DrawingBackend>(
        figure: &Figure,
        axis: &TimeAxis,
        area: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawerError> {
        let sub_traces: Vec<&Trace> = figure.data.iter().filter(|t| t.is_sub_panel()).collect();

        let values = sub_traces.iter().flat_map(|t| match t {
            Trace::Bar(b) => b.y.iter().flatten().copied().collect::<Vec<_>>(),
            Trace::Scatter(s) => s.y.iter().flatten().copied().collect(),
            _ => Vec::new(),
        });

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(axis.range(), value_range(values, true))
            .map_err(render_err)?;

        let x_fmt = |x: &f64| axis.label(*x);
        chart
            .configure_mesh()
            .disable_mesh()
            .axis_style(AXIS_LINE)
            .x_labels(8)
            .x_label_formatter(&x_fmt)
            .y_labels(4)
            .draw()
            .map_err(render_err)?;

        for trace in sub_traces {
            match trace {
                Trace::Bar(t) => {
                    let colors = point_colors(
                        t.marker.as_ref().and_then(|m| m.color.as_ref()),
                        t.y.len(),
                        DOWN,
                    );
                    let bars = t.x.iter().zip(&t.y).zip(colors).filter_map(|((ts, v), c)| {
                        let v = v.filter(|v| v.is_finite())?;
                        let x = axis.pos(ts);
                        Some(Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], c.filled()))
                    });
                    chart.draw_series(bars).map_err(render_err)?;
                }
                Trace::Scatter(t) => {
                    let points = finite_points(axis, &t.x, &t.y);
                    chart
                        .draw_series(LineSeries::new(points.clone(), AXIS_LINE.stroke_width(1)))
                        .map_err(render_err)?;

                    let colors = point_colors(
                        t.marker.as_ref().and_then(|m| m.color.as_ref()),
                        t.y.len(),
                        DOWN,
                    );
                    let dots = t.x.iter().zip(&t.y).zip(colors).filter_map(|((ts, v), c)| {
                        let v = v.filter(|v| v.is_finite())?;
                        Some(Circle::new((axis.pos(ts), v), 2, c.filled()))
                    });
                    chart.draw_series(dots).map_err(render_err)?;
                }
                _ => {}
            }
        }

        Ok(())
    }
}
