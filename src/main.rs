//! Kline Drawer - render entity-keyed CSV tables as interactive charts.
//!
//! Subcommands:
//!   - `kline`: candlesticks with indicator overlays and a sub-panel
//!   - `line`: one line per entity column
//!   - `area`: one filled area per entity column
//!   - `scatter`: one marker series per entity column
//!   - `table`: the main table as a plotly table

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use kline_drawer::data::read_csv;
use kline_drawer::{DrawOptions, Drawer, DrawerConfig, Figure, ScatterMode, SubChart};

#[derive(Parser)]
#[command(
    name = "kline_drawer",
    version,
    about = "Render entity-keyed financial tables as interactive charts",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Candlestick chart (needs open/high/low/close columns)
    Kline(DrawArgs),
    /// Line chart of every main column
    Line(DrawArgs),
    /// Filled area chart of every main column
    Area(DrawArgs),
    /// Marker chart of every main column
    Scatter(DrawArgs),
    /// Show the main table
    Table(DrawArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum SubChartArg {
    Bar,
    Line,
}

impl From<SubChartArg> for SubChart {
    fn from(arg: SubChartArg) -> Self {
        match arg {
            SubChartArg::Bar => SubChart::Bar,
            SubChartArg::Line => SubChart::Line,
        }
    }
}

#[derive(Parser)]
struct DrawArgs {
    /// Main CSV with entity_id, timestamp and value columns
    #[arg(long)]
    main: PathBuf,

    /// Indicator CSV drawn over the main panel (repeatable)
    #[arg(long)]
    factor: Vec<PathBuf>,

    /// CSV drawn in the sub-panel
    #[arg(long)]
    sub: Option<PathBuf>,

    /// Annotation CSV with entity_id, timestamp, value, flag and optional color
    #[arg(long)]
    annotations: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long, value_enum, default_value_t = SubChartArg::Bar)]
    sub_chart: SubChartArg,

    /// Reset pan/zoom on every refresh
    #[arg(long)]
    no_keep_ui_state: bool,

    /// Save to this path (.html, .json, .png or .svg) instead of showing
    #[arg(long, conflicts_with = "name")]
    output: Option<PathBuf>,

    /// File name (without extension) under the UI directory when showing
    #[arg(long)]
    name: Option<String>,
}

impl DrawArgs {
    fn options(&self) -> DrawOptions {
        DrawOptions {
            width: self.width,
            height: self.height,
            title: self.title.clone(),
            keep_ui_state: !self.no_keep_ui_state,
            sub_chart: self.sub_chart.into(),
            ..Default::default()
        }
    }

    fn drawer(&self) -> Result<Drawer> {
        let mut builder = Drawer::builder().main_df(
            read_csv(&self.main).with_context(|| format!("reading {}", self.main.display()))?,
        );
        for path in &self.factor {
            builder = builder
                .factor_df(read_csv(path).with_context(|| format!("reading {}", path.display()))?);
        }
        if let Some(path) = &self.sub {
            builder =
                builder.sub_df(read_csv(path).with_context(|| format!("reading {}", path.display()))?);
        }
        if let Some(path) = &self.annotations {
            builder = builder
                .annotation_df(read_csv(path).with_context(|| format!("reading {}", path.display()))?);
        }
        Ok(builder.build()?)
    }
}

fn emit(figure: Figure, args: &DrawArgs, config: &DrawerConfig) -> Result<()> {
    match &args.output {
        Some(path) => {
            figure.save(path)?;
            println!("{}", path.display());
        }
        None => {
            let path = figure.show(config, args.name.as_deref())?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = DrawerConfig::from_env();

    match cli.command {
        Commands::Kline(args) => {
            let figure = args.drawer()?.draw_kline(&args.options());
            emit(figure, &args, &config)
        }
        Commands::Line(args) => {
            let figure = args.drawer()?.draw_line(&args.options());
            emit(figure, &args, &config)
        }
        Commands::Area(args) => {
            let figure = args.drawer()?.draw_area(&args.options());
            emit(figure, &args, &config)
        }
        Commands::Scatter(args) => {
            let figure = args
                .drawer()?
                .draw_scatter(ScatterMode::Markers, &args.options());
            emit(figure, &args, &config)
        }
        Commands::Table(args) => {
            let path = args.drawer()?.show_table(&args.options(), &config)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
