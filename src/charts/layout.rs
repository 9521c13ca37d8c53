//! Shared layout assembly for every draw operation.

use crate::charts::figure::{Axis, Layout, Legend, Title};

const AXIS_LINE_COLOR: &str = "#BCCCDC";

// Two rows with heights 0.8 / 0.2 of the area left after 0.08 spacing.
const MAIN_PANEL_DOMAIN: [f64; 2] = [0.264, 1.0];
const SUB_PANEL_DOMAIN: [f64; 2] = [0.0, 0.184];

#[derive(Debug, Clone, Copy)]
pub struct LayoutParams<'a> {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<&'a str>,
    /// Keep pan/zoom state across data refreshes.
    pub keep_ui_state: bool,
    /// Declare the secondary y-axis for a sub-panel.
    pub subplot: bool,
}

impl Default for LayoutParams<'_> {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            title: None,
            keep_ui_state: true,
            subplot: false,
        }
    }
}

pub fn gen_layout(params: &LayoutParams<'_>) -> Layout {
    let mut yaxis = Axis {
        autorange: Some(true),
        fixedrange: Some(false),
        zeroline: Some(false),
        linecolor: Some(AXIS_LINE_COLOR.into()),
        showgrid: Some(false),
        ..Default::default()
    };

    let mut xaxis = Axis {
        linecolor: Some(AXIS_LINE_COLOR.into()),
        showgrid: Some(false),
        showspikes: Some(true),
        spikethickness: Some(2),
        spikedash: Some("dot".into()),
        spikecolor: Some("#999999".into()),
        spikemode: Some("across".into()),
        ..Default::default()
    };

    let yaxis2 = params.subplot.then(|| {
        yaxis.domain = Some(MAIN_PANEL_DOMAIN);
        // The single x-axis sits under the sub-panel so both panels share it.
        xaxis.anchor = Some("y2".into());
        Axis {
            autorange: Some(true),
            fixedrange: Some(false),
            zeroline: Some(false),
            domain: Some(SUB_PANEL_DOMAIN),
            anchor: Some("x".into()),
            ..Default::default()
        }
    });

    Layout {
        showlegend: true,
        plot_bgcolor: "#FFF".into(),
        hovermode: "x".into(),
        hoverdistance: 100,
        spikedistance: 1000,
        uirevision: params.keep_ui_state.then_some(true),
        width: params.width,
        height: params.height,
        title: params.title.map(|text| Title { text: text.into() }),
        annotations: Vec::new(),
        shapes: Vec::new(),
        xaxis,
        yaxis,
        yaxis2,
        legend: Legend {
            orientation: "h".into(),
        },
    }
}
