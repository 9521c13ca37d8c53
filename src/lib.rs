//! Kline Drawer - entity-keyed financial charts
//!
//! Turns per-entity time-series tables into plotly figures: candlestick or
//! scatter-family main panel, indicator overlays, an x-linked sub-panel,
//! highlight rectangles and annotation markers.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;

pub use charts::{DrawOptions, Drawable, Drawer, Figure, Rect, ScatterMode, SubChart, TraceStyle};
pub use config::DrawerConfig;
pub use data::{AnnotationTable, EntityFrame, NormalData};
pub use error::{DataError, DrawerError};
