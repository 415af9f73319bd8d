//! FILENAME: app/dashboard/src/cli.rs
//! Command-line surface of the dashboard binary.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::{info, warn};

use dataset::{DateRange, OrderTable};
use persistence::load_orders_csv;
use summary_engine::{compute_summaries_with, SummaryRequest};

use crate::config::{DashboardConfig, OutputFormat};
use crate::logging;
use crate::report::{render_text, JsonReport};

#[derive(Parser, Debug)]
#[command(about = "Summarise an e-commerce order dataset over a range of purchase dates.")]
pub struct Args {
    /// Cleaned order dataset (CSV). Overrides `data_path` from the config file.
    data: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// First purchase day to include (YYYY-MM-DD). Defaults to the earliest day in the data.
    #[arg(long, value_name = "DATE")]
    start: Option<NaiveDate>,

    /// Last purchase day to include (YYYY-MM-DD). Defaults to the latest day in the data.
    #[arg(long, value_name = "DATE")]
    end: Option<NaiveDate>,

    /// Rows shown in each ranked section.
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Currency symbol placed before monetary amounts.
    #[arg(long, value_name = "SYMBOL")]
    currency_symbol: Option<String>,

    /// Group rows with an empty category, city or state under this label
    /// instead of leaving them out.
    #[arg(long, value_name = "LABEL")]
    unknown_label: Option<String>,

    /// More log output on stderr (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// The config file (if any) with every flag given on the command line
    /// applied on top.
    pub fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };

        if let Some(data) = &self.data {
            config.data_path = Some(data.clone());
        }
        if self.start.is_some() {
            config.start = self.start;
        }
        if self.end.is_some() {
            config.end = self.end;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(symbol) = &self.currency_symbol {
            config.currency.symbol = symbol.clone();
        }
        if let Some(label) = &self.unknown_label {
            config.unknown_label = Some(label.clone());
        }

        if config.unknown_label.as_deref().is_some_and(|l| l.trim().is_empty()) {
            anyhow::bail!("unknown label must not be blank");
        }

        Ok(config)
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose).context("failed to install logger")?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    run_with_args(&args, &mut handle)
}

/// Load, summarise and render to `out`. Does not install a logger.
pub fn run_with_args<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    let config = args.resolve_config()?;
    let data_path = config
        .data_path
        .as_deref()
        .context("no dataset given (pass a CSV path or set data_path in the config file)")?;

    let table = load_orders_csv(data_path, &config.csv)
        .with_context(|| format!("failed to load orders from {}", data_path.display()))?;
    let range = resolve_range(&table, config.start, config.end)?;
    info!("summarising {} rows over {}", table.len(), range);

    let request = SummaryRequest::new(range).with_missing_key(config.missing_key_policy());
    let bundle = compute_summaries_with(&table, &request).context("failed to summarise orders")?;

    match config.format {
        OutputFormat::Text => {
            out.write_all(render_text(&bundle, &config.report_options()).as_bytes())?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &JsonReport::new(&bundle, config.top_n))?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Purchase-day range to summarise. Missing bounds default to the data's own
/// span, and given bounds overlapping it are clamped to it. A range entirely
/// outside the data is kept as requested so its days report zero orders. A
/// start after the end yields an empty range rather than an error.
pub fn resolve_range(
    table: &OrderTable,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<DateRange> {
    let span = table.timestamp_span()?;

    let Some(span) = span else {
        return match (start, end) {
            (Some(start), Some(end)) => Ok(DateRange::new(start, end)),
            _ => anyhow::bail!("dataset has no purchase timestamps; pass both --start and --end"),
        };
    };

    let requested = DateRange::new(start.unwrap_or(span.start), end.unwrap_or(span.end));
    if requested.is_empty() {
        return Ok(requested);
    }

    let clamped = requested.clamp_to(&span);
    if clamped.is_empty() {
        warn!("no orders between {} and {} (data covers {})", requested.start, requested.end, span);
        return Ok(requested);
    }
    if clamped != requested {
        warn!("requested {} lies partly outside the data ({}); using {}", requested, span, clamped);
    }
    Ok(clamped)
}
