//! Magnitude CLI
//!
//! Loads a chart from magnitude.toml, applies host operations and prints
//! the resulting state as JSON.

mod config;
mod project;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use magnitude_charts::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::{read_samples, MagnitudeConfig};

#[derive(Parser, Debug)]
#[command(name = "magnitude")]
#[command(about = "Inspect magnitude chart layouts, mappings and brush selections")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a sample magnitude.toml and data file
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing magnitude.toml
        #[arg(long)]
        force: bool,
    },

    /// Print the chart snapshot after applying edits
    Layout(LayoutArgs),

    /// Map domain values to pixels
    Map {
        #[command(flatten)]
        chart: ChartArgs,

        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Map pixels back to domain values
    Invert {
        #[command(flatten)]
        chart: ChartArgs,

        #[arg(required = true, allow_negative_numbers = true)]
        pixels: Vec<f64>,
    },

    /// Brush a pixel interval and print the domain selection
    Brush {
        #[command(flatten)]
        chart: ChartArgs,

        #[arg(allow_negative_numbers = true)]
        from: f64,

        #[arg(allow_negative_numbers = true)]
        to: f64,
    },
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Config file, or a directory containing magnitude.toml
    #[arg(short, long, default_value = ".")]
    config: PathBuf,

    /// Insert boundaries before anything else runs
    #[arg(long = "split", value_name = "VALUE", allow_negative_numbers = true)]
    splits: Vec<f64>,

    /// Remove interior boundaries by index, applied after splits
    #[arg(long = "remove", value_name = "INDEX")]
    removals: Vec<usize>,

    #[arg(long)]
    mode: Option<ModeArg>,

    #[arg(long)]
    geometry: Option<GeometryArg>,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    #[command(flatten)]
    chart: ChartArgs,

    /// Per-segment bin widths, comma separated
    #[arg(long, value_delimiter = ',')]
    bin_size: Option<Vec<f64>>,

    #[arg(long = "type")]
    kind: Option<KindArg>,

    /// Filtered sample file drawn as the foreground series
    #[arg(long)]
    crossfilter: Option<PathBuf>,

    /// Grid line domain values, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    grid_x: Option<Vec<f64>>,

    /// Grid line counts, comma separated
    #[arg(long, value_delimiter = ',')]
    grid_count: Option<Vec<f64>>,

    /// Horizontal guide counts, comma separated
    #[arg(long, value_delimiter = ',')]
    hline: Option<Vec<f64>>,

    /// Vertical guide values, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    vline: Option<Vec<f64>>,

    /// Emit compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Install,
    Hover,
}

impl From<ModeArg> for PrismMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Install => PrismMode::Install,
            ModeArg::Hover => PrismMode::Hover,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GeometryArg {
    Flat,
    Offset,
}

impl From<GeometryArg> for PrismGeometry {
    fn from(g: GeometryArg) -> Self {
        match g {
            GeometryArg::Flat => PrismGeometry::Flat,
            GeometryArg::Offset => PrismGeometry::Offset,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Line,
    Bar,
}

impl From<KindArg> for SeriesKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Line => SeriesKind::Line,
            KindArg::Bar => SeriesKind::Bar,
        }
    }
}

#[derive(Serialize)]
struct Mapped {
    value: f64,
    segment: usize,
    px: f64,
}

#[derive(Serialize)]
struct Inverted {
    px: f64,
    value: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Init { path, force } => {
            project::create_project(&path, force)?;
            eprintln!("Created magnitude.toml in {}", path.display());
        }
        Command::Layout(args) => layout(args)?,
        Command::Map { chart, values } => {
            let handle = open(&chart)?;
            let mapped: Vec<Mapped> = values
                .iter()
                .zip(handle.forward(&values)?)
                .map(|(&value, (segment, px))| Mapped { value, segment, px })
                .collect();
            print_json(&mapped, false)?;
        }
        Command::Invert { chart, pixels } => {
            let handle = open(&chart)?;
            let inverted: Vec<Inverted> = pixels
                .iter()
                .zip(handle.inverse(&pixels)?)
                .map(|(&px, value)| Inverted { px, value })
                .collect();
            print_json(&inverted, false)?;
        }
        Command::Brush { chart, from, to } => {
            let handle = open(&chart)?;
            let selection = handle.brush(Some((from, to)))?;
            let event = selection.map_or_else(FilterEvent::cleared, FilterEvent::selected);
            print_json(&event, false)?;
        }
    }

    Ok(())
}

/// Build the chart from config and apply the shared edit flags
fn open(args: &ChartArgs) -> Result<MagnitudeChartHandle> {
    let config = MagnitudeConfig::load_from_dir(&args.config)?;
    let handle = MagnitudeChartHandle::from_config(config.resolve_chart()?)
        .context("Invalid chart configuration")?;

    for &value in &args.splits {
        let at = handle
            .split(value)
            .with_context(|| format!("Cannot split at {value}"))?;
        tracing::info!(value, index = at, "split");
    }
    for &index in &args.removals {
        let value = handle
            .remove_prism(index)
            .with_context(|| format!("Cannot remove boundary {index}"))?;
        tracing::info!(value, index, "removed boundary");
    }
    if let Some(mode) = args.mode {
        handle.set_prism_mode(mode.into())?;
    }
    if let Some(geometry) = args.geometry {
        handle.set_prism_geometry(geometry.into())?;
    }
    Ok(handle)
}

fn layout(args: LayoutArgs) -> Result<()> {
    let handle = open(&args.chart)?;

    if let Some(sizes) = args.bin_size {
        handle.bin_size(sizes).context("Invalid --bin-size")?;
    }
    if let Some(kind) = args.kind {
        handle.set_type(kind.into())?;
    }
    if let Some(path) = &args.crossfilter {
        let subset = read_samples(&resolve(&args.chart.config, path))?;
        handle.crossfilter(Some(subset))?;
    }
    if args.grid_x.is_some() || args.grid_count.is_some() {
        handle.custom_grid_line(
            args.grid_x.unwrap_or_default(),
            args.grid_count.unwrap_or_default(),
        )?;
    }
    if let Some(counts) = args.hline {
        handle.horizontal_lines(counts)?;
    }
    if let Some(values) = args.vline {
        handle.vertical_lines(values)?;
    }

    print_json(&handle.snapshot()?, args.compact)
}

/// Relative paths are taken from the working directory unless missing there
fn resolve<'a>(config: &Path, path: &'a Path) -> std::borrow::Cow<'a, Path> {
    if path.is_absolute() || path.exists() {
        return path.into();
    }
    let base = if config.is_file() {
        config.parent().unwrap_or(config)
    } else {
        config
    };
    base.join(path).into()
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}
