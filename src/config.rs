use chrono::Local;
use std::env;
use std::path::PathBuf;

use crate::charts::html::DEFAULT_PLOTLY_JS;

/// ISO-8601 with milliseconds; used for file names when none is given.
pub const TIME_FORMAT_ISO8601: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Output configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct DrawerConfig {
    /// Directory that shown and saved figures are written to.
    pub ui_path: PathBuf,
    /// Script URL for plotly.js in generated pages.
    pub plotly_js: String,
    /// Open shown figures with the system default app.
    pub open_browser: bool,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            ui_path: PathBuf::from("ui"),
            plotly_js: DEFAULT_PLOTLY_JS.to_string(),
            open_browser: true,
        }
    }
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
        .unwrap_or(default)
}

impl DrawerConfig {
    /// Read `KLINE_DRAWER_UI_PATH`, `KLINE_DRAWER_PLOTLY_JS` and `KLINE_DRAWER_OPEN`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ui_path: PathBuf::from(env_str(
                "KLINE_DRAWER_UI_PATH",
                &defaults.ui_path.to_string_lossy(),
            )),
            plotly_js: env_str("KLINE_DRAWER_PLOTLY_JS", &defaults.plotly_js),
            open_browser: env_bool("KLINE_DRAWER_OPEN", defaults.open_browser),
        }
    }

    pub fn with_ui_path(mut self, ui_path: impl Into<PathBuf>) -> Self {
        self.ui_path = ui_path.into();
        self
    }

    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// `{ui_path}/{name}.{ext}`, named after the current time when `name` is `None`.
    pub fn ui_path(&self, name: Option<&str>, ext: &str) -> PathBuf {
        let stem = match name {
            Some(name) => name.to_string(),
            None => Local::now().format(TIME_FORMAT_ISO8601).to_string(),
        };
        self.ui_path.join(format!("{stem}.{ext}"))
    }
}
