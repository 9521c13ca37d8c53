//! Standalone HTML pages for interactive figures.

use crate::charts::Figure;
use crate::error::DrawerError;
use std::fs;
use std::path::Path;

pub const DEFAULT_PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const PLOT_DIV_ID: &str = "kline-drawer-plot";

/// Build a page that loads plotly.js from `plotly_js` and plots `figure`.
pub fn to_html(figure: &Figure, plotly_js: &str) -> Result<String, DrawerError> {
    // `</` inside a string literal would end the script element early.
    let json = figure.to_json()?.replace("</", "<\\/");
    let title = figure
        .layout
        .title
        .as_ref()
        .map(|t| escape_html(&t.text))
        .unwrap_or_else(|| "kline_drawer".to_string());

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{plotly_js}"></script>
</head>
<body>
<div id="{PLOT_DIV_ID}" style="width:100%;height:100vh;"></div>
<script>
var figure = {json};
Plotly.newPlot("{PLOT_DIV_ID}", figure.data, figure.layout, {{responsive: true}});
</script>
</body>
</html>
"#
    ))
}

pub fn write_html(figure: &Figure, path: &Path, plotly_js: &str) -> Result<(), DrawerError> {
    fs::write(path, to_html(figure, plotly_js)?)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
