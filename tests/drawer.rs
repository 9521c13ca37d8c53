mod helpers;

use helpers::{annotation_df, kdata_df, ma_df, slope_df};
use kline_drawer::charts::Trace;
use kline_drawer::{DrawOptions, Drawer, ScatterMode};

fn trace_names(figure: &kline_drawer::Figure) -> Vec<String> {
    figure
        .traces()
        .iter()
        .filter_map(|t| t.name().map(String::from))
        .collect()
}

#[test]
fn kline_has_one_primary_trace_per_entity() {
    let drawer = Drawer::from_df(&kdata_df()).unwrap();
    let figure = drawer.draw_kline(&DrawOptions::default());

    assert_eq!(trace_names(&figure), vec!["600000_kdata", "000338_kdata"]);
    assert!(!figure.has_sub_panel());

    let json = figure.to_json_value().unwrap();
    assert_eq!(json["data"][0]["type"], "candlestick");
    assert_eq!(json["data"][0]["open"][0], 7.0);
    assert!(json["layout"].get("yaxis2").is_none());
}

#[test]
fn scatter_family_has_one_trace_per_entity_column() {
    let drawer = Drawer::from_df(&kdata_df()).unwrap();

    for figure in [
        drawer.draw_line(&DrawOptions::default()),
        drawer.draw_area(&DrawOptions::default()),
        drawer.draw_scatter(ScatterMode::Markers, &DrawOptions::default()),
    ] {
        assert_eq!(figure.traces().len(), 2 * 4);
        assert!(figure
            .traces()
            .iter()
            .all(|t| matches!(t, Trace::Scatter(_))));
    }
}

#[test]
fn indicators_and_sub_panel_compose() {
    let drawer = Drawer::builder()
        .main_df(kdata_df())
        .factor_df(ma_df())
        .sub_df(slope_df())
        .build()
        .unwrap();

    let figure = drawer.draw_kline(&DrawOptions::default());
    assert!(figure.has_sub_panel());
    assert_eq!(
        trace_names(&figure),
        vec![
            "600000_kdata",
            "000338_kdata",
            "000338_ma5",
            "000338_ma10",
            "600000_slope",
            "000338_slope",
        ]
    );

    let json = figure.to_json_value().unwrap();
    let layout = &json["layout"];
    assert_eq!(layout["yaxis2"]["autorange"], true);
    assert_eq!(layout["xaxis"]["anchor"], "y2");

    // 600000: -1.0, 2.0, 0.0 ; 000338: 0.5, 0.0, -0.3
    assert_eq!(
        json["data"][4]["marker"]["color"],
        serde_json::json!(["green", "red", "green"])
    );
    assert_eq!(
        json["data"][5]["marker"]["color"],
        serde_json::json!(["red", "green", "green"])
    );
    assert_eq!(json["data"][5]["yaxis"], "y2");
}

#[test]
fn empty_sub_panel_keeps_single_panel() {
    let empty = slope_df().head(Some(0));
    let drawer = Drawer::builder()
        .main_df(kdata_df())
        .sub_df(empty)
        .build()
        .unwrap();

    let figure = drawer.draw_kline(&DrawOptions::default());
    assert!(!figure.has_sub_panel());
    assert_eq!(figure.traces().len(), 2);
}

#[test]
fn annotation_table_rows_become_markers() {
    let drawer = Drawer::builder()
        .main_df(kdata_df())
        .annotation_df(annotation_df())
        .build()
        .unwrap();

    let json = drawer
        .draw_kline(&DrawOptions::default())
        .to_json_value()
        .unwrap();
    let annotations = json["layout"]["annotations"].as_array().unwrap();

    assert_eq!(annotations.len(), 2);
    // Grouped by entity id: stock_sh_600000 first.
    assert_eq!(annotations[0]["text"], "sell");
    assert_eq!(annotations[0]["y"], 2.0);
    assert_eq!(annotations[0]["bgcolor"], "#00ff00");
    assert_eq!(annotations[1]["text"], "buy");
    assert_eq!(annotations[1]["y"], 1.0);
    assert_eq!(annotations[1]["bgcolor"], "#ec0000");
    assert_eq!(annotations[1]["showarrow"], true);
    assert_eq!(annotations[1]["arrowhead"], 2);
}

#[test]
fn persistence_flag_only_touches_uirevision() {
    let drawer = Drawer::builder()
        .main_df(kdata_df())
        .sub_df(slope_df())
        .build()
        .unwrap();

    let kept = drawer
        .draw_kline(&DrawOptions::default())
        .to_json_value()
        .unwrap();
    let mut reset = drawer
        .draw_kline(&DrawOptions::default().keep_ui_state(false))
        .to_json_value()
        .unwrap();

    assert_eq!(kept["data"], reset["data"]);
    assert_eq!(kept["layout"]["uirevision"], true);
    assert!(reset["layout"].get("uirevision").is_none());

    reset["layout"]["uirevision"] = serde_json::Value::Bool(true);
    assert_eq!(kept, reset);
}

#[test]
fn missing_main_group_draws_nothing() {
    let drawer = Drawer::builder().build().unwrap();
    let figure = drawer.draw_kline(&DrawOptions::default().title("empty"));

    assert!(figure.traces().is_empty());
    assert_eq!(figure.layout.title.as_ref().unwrap().text, "empty");
}

#[test]
fn raw_table_without_index_is_rejected() {
    let df = polars::df!("close" => [1.0]).unwrap();
    assert!(Drawer::builder().main_df(df).build().is_err());
}

#[test]
fn malformed_indicator_table_does_not_blank_the_figure() {
    let ma_without_time = polars::df!(
        "entity_id" => ["stock_sz_000338"],
        "ma5" => [10.1]
    )
    .unwrap();

    let drawer = Drawer::builder()
        .main_df(kdata_df())
        .factor_df(ma_without_time)
        .factor_df(ma_df())
        .build()
        .unwrap();

    let figure = drawer.draw_kline(&DrawOptions::default());
    assert_eq!(
        trace_names(&figure),
        vec!["600000_kdata", "000338_kdata", "000338_ma5", "000338_ma10"]
    );
}
