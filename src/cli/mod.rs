//! Command-line parsing for the Mexican FX and rates sheet builder.
//!
//! Argument parsing and command dispatch stay separate from the series engine
//! and the data clients; `app` turns these structs into configs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ratesheet", version, about = "Daily Mexican FX and rates sheet (Banxico SIE / INEGI / FRED)")]
pub struct Cli {
    /// Log verbosity (trace, debug, info, warn, error). Logs go to stderr.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// TOML file with API tokens (default: ./secrets.toml when present).
    #[arg(long, global = true, value_name = "TOML")]
    pub secrets: Option<PathBuf>,

    /// Banxico SIE token (overrides secrets file and BANXICO_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub banxico_token: Option<String>,

    /// INEGI indicators token (overrides secrets file and INEGI_TOKEN).
    #[arg(long, global = true, value_name = "TOKEN")]
    pub inegi_token: Option<String>,

    /// FRED API key (overrides secrets file and FRED_API_KEY).
    #[arg(long, global = true, value_name = "KEY")]
    pub fred_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every indicator, align to business days, print and write the sheet.
    Report(ReportArgs),
    /// Fetch one Banxico series and print it aligned to business days.
    Series(SeriesArgs),
    /// Align observations from a local CSV (no network).
    Align(AlignArgs),
    /// Probe each data source and report status and latency.
    Status,
}

/// Business-day column selection shared by the commands that align.
#[derive(Debug, Args, Clone)]
pub struct CalendarArgs {
    /// Last column date, YYYY-MM-DD (default: today in Mexico City).
    #[arg(long)]
    pub asof: Option<NaiveDate>,

    /// Number of business-day columns ending at the as-of date.
    #[arg(long, default_value_t = 6)]
    pub days: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub calendar: CalendarArgs,

    /// Calendar days of history requested before the first column.
    #[arg(long, default_value_t = 730)]
    pub lookback_days: i64,

    /// Rolling window (observations) for the smoothed USD rate.
    #[arg(long, default_value_t = 5)]
    pub window: usize,

    /// Buy/sell margin over the smoothed USD rate, in percent.
    #[arg(long, default_value_t = 0.5)]
    pub margin: f64,

    /// Daily UMA to use when INEGI returns nothing.
    #[arg(long, value_name = "MXN")]
    pub uma_manual: Option<f64>,

    /// Directory for the sheet CSVs (indicadores.csv, raw.csv, fred.csv).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Also write the raw observations sheet (needs --out).
    #[arg(long)]
    pub raw: bool,

    /// Export the full report (values and fill flags) to JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,

    /// Optional FRED series id to include as its own sheet (e.g. DGS10).
    #[arg(long, value_name = "SERIES_ID")]
    pub fred: Option<String>,

    /// Number of most recent raw observations kept per series.
    #[arg(long, default_value_t = 6)]
    pub last_n: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// Banxico SIE series id (e.g. SF43718) or indicator name (e.g. usd-fix).
    pub series_id: String,

    #[command(flatten)]
    pub calendar: CalendarArgs,

    /// Calendar days of history requested before the first column.
    #[arg(long, default_value_t = 30)]
    pub lookback_days: i64,
}

#[derive(Debug, Args, Clone)]
pub struct AlignArgs {
    /// CSV with `date,value` columns.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    #[command(flatten)]
    pub calendar: CalendarArgs,

    /// Explicit target dates (comma-separated), instead of business days.
    #[arg(long, value_delimiter = ',')]
    pub dates: Vec<NaiveDate>,

    /// Treat values as whole percent and show them as decimal fractions.
    #[arg(long)]
    pub percent: bool,
}
