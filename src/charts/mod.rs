//! Charts module - figure model, drawer and output

pub mod annotation;
mod drawer;
pub mod figure;
pub mod html;
pub mod layout;
mod renderer;
mod style;

pub use drawer::{sub_color, Drawable, Drawer, DrawerBuilder, MainChart, Rect, DOWN_COLOR, UP_COLOR};
pub use figure::{Figure, Trace};
pub use renderer::StaticChartRenderer;
pub use style::{DrawOptions, ScatterMode, SubChart, TraceStyle};
