#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;

pub fn kdata_df() -> DataFrame {
    df!(
        "entity_id" => [
            "stock_sz_000338", "stock_sz_000338", "stock_sz_000338",
            "stock_sh_600000", "stock_sh_600000", "stock_sh_600000",
        ],
        "timestamp" => [
            "2024-01-02", "2024-01-03", "2024-01-04",
            "2024-01-02", "2024-01-03", "2024-01-04",
        ],
        "open" => [10.0, 10.5, 10.2, 7.0, 7.1, 7.3],
        "high" => [10.8, 10.9, 10.6, 7.2, 7.4, 7.5],
        "low" => [9.9, 10.1, 10.0, 6.9, 7.0, 7.2],
        "close" => [10.5, 10.2, 10.4, 7.1, 7.3, 7.4]
    )
    .unwrap()
}

pub fn ma_df() -> DataFrame {
    df!(
        "entity_id" => ["stock_sz_000338", "stock_sz_000338", "stock_sz_000338"],
        "timestamp" => ["2024-01-02", "2024-01-03", "2024-01-04"],
        "ma5" => [10.1, 10.2, 10.3],
        "ma10" => [10.0, 10.05, 10.1]
    )
    .unwrap()
}

pub fn slope_df() -> DataFrame {
    df!(
        "entity_id" => [
            "stock_sz_000338", "stock_sz_000338", "stock_sz_000338",
            "stock_sh_600000", "stock_sh_600000", "stock_sh_600000",
        ],
        "timestamp" => [
            "2024-01-02", "2024-01-03", "2024-01-04",
            "2024-01-02", "2024-01-03", "2024-01-04",
        ],
        "slope" => [0.5, 0.0, -0.3, -1.0, 2.0, 0.0]
    )
    .unwrap()
}

pub fn annotation_df() -> DataFrame {
    df!(
        "entity_id" => ["stock_sz_000338", "stock_sh_600000"],
        "timestamp" => ["2024-01-02", "2024-01-04"],
        "value" => [1.005, 2.0],
        "flag" => ["buy", "sell"],
        "color" => [None, Some("#00ff00")]
    )
    .unwrap()
}

/// Fresh scratch directory per test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("kline_drawer_tests")
        .join(format!("{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
