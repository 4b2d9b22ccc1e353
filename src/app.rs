//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves API tokens
//! - runs the report/series/align pipelines
//! - prints tables and writes the sheet files

use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::cli::{AlignArgs, CalendarArgs, Cli, Command, ReportArgs, SeriesArgs};
use crate::config::{Settings, TokenOverrides};
use crate::data::SieClient;
use crate::domain::{Quote, ReportConfig, StatusLevel};
use crate::error::AppError;
use crate::io::{read_observations_csv, write_fred_csv, write_layout_csv, write_raw_csv, write_report_json};
use crate::report::{IndicatorReport, format_aligned, format_report, format_status};
use crate::series::{MAX_BUSINESS_DAYS, business_days_ending, normalize, today_mexico_city};

pub mod pipeline;
pub mod status;

pub const SHEET_FILE: &str = "indicadores.csv";
pub const RAW_FILE: &str = "raw.csv";
pub const FRED_FILE: &str = "fred.csv";

/// Entry point for the `ratesheet` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let overrides = TokenOverrides {
        banxico: cli.banxico_token.clone(),
        inegi: cli.inegi_token.clone(),
        fred: cli.fred_api_key.clone(),
    };

    // `align` never needs tokens.
    if let Command::Align(args) = &cli.command {
        return handle_align(args);
    }

    let settings = Settings::load(&overrides, cli.secrets.as_deref())?;
    info!(
        banxico = settings.banxico.source().label(),
        inegi = settings.inegi.source().label(),
        fred = settings.fred.source().label(),
        secrets = %settings.secrets_label(),
        "resolved tokens"
    );

    match cli.command {
        Command::Report(args) => handle_report(&args, &settings),
        Command::Series(args) => handle_series(&args, &settings),
        Command::Align(_) => Ok(()),
        Command::Status => handle_status(&settings),
    }
}

fn init_logging(log_level: &str) -> Result<(), AppError> {
    let level = match log_level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            return Err(AppError::config(format!(
                "Invalid --log-level '{other}' (expected trace, debug, info, warn, or error)."
            )));
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::config(format!("Failed to initialize logging: {e}")))
}

fn handle_report(args: &ReportArgs, settings: &Settings) -> Result<(), AppError> {
    let config = report_config_from_args(args)?;
    let report = pipeline::run_report(&config, settings)?;

    println!("{}", format_report(&report));
    write_outputs(&report, &config)
}

fn handle_series(args: &SeriesArgs, settings: &Settings) -> Result<(), AppError> {
    validate_calendar(&args.calendar)?;
    let client = SieClient::from_settings(settings)?;
    let asof = args.calendar.asof.unwrap_or_else(today_mexico_city);

    let view = pipeline::run_series(&client, &args.series_id, asof, args.calendar.days, args.lookback_days)?;
    println!("{}", format_aligned(&view.label, &view.dates, &view.aligned, view.format));
    println!("observations: {} (dropped {})", view.observations, view.dropped);
    Ok(())
}

fn handle_align(args: &AlignArgs) -> Result<(), AppError> {
    let raw = read_observations_csv(&args.input)?;
    let map = normalize(&raw);
    if map.is_empty() {
        return Err(AppError::no_data(format!(
            "No usable observations in '{}'.",
            args.input.display()
        )));
    }

    let dates = if args.dates.is_empty() {
        validate_calendar(&args.calendar)?;
        let asof = args.calendar.asof.unwrap_or_else(today_mexico_city);
        business_days_ending(asof, args.calendar.days)
    } else {
        args.dates.clone()
    };

    let label = args
        .input
        .file_name()
        .map_or_else(|| args.input.display().to_string(), |n| n.to_string_lossy().into_owned());
    let quote = if args.percent { Quote::Percent } else { Quote::Level };
    let view = pipeline::view_series(&label, &map, dates, quote);

    println!("{}", format_aligned(&view.label, &view.dates, &view.aligned, view.format));
    println!("observations: {} (dropped {})", view.observations, view.dropped);
    for c in map.conflicts() {
        println!("duplicate {}: {} replaced by {}", c.date, c.replaced, c.kept);
    }
    Ok(())
}

fn handle_status(settings: &Settings) -> Result<(), AppError> {
    let statuses = status::probe_sources(settings);
    println!("{}", format_status(&statuses));
    println!("secrets file: {}", settings.secrets_label());

    let failed = statuses.iter().filter(|s| s.level == StatusLevel::Err).count();
    if failed > 0 {
        return Err(AppError::upstream(format!("{failed} data source(s) unavailable.")));
    }
    Ok(())
}

fn validate_calendar(args: &CalendarArgs) -> Result<(), AppError> {
    if args.days == 0 || args.days > MAX_BUSINESS_DAYS {
        return Err(AppError::config(format!("--days must be between 1 and {MAX_BUSINESS_DAYS}.")));
    }
    Ok(())
}

/// Validate report flags and resolve defaults into a `ReportConfig`.
pub fn report_config_from_args(args: &ReportArgs) -> Result<ReportConfig, AppError> {
    validate_calendar(&args.calendar)?;
    if args.window == 0 {
        return Err(AppError::config("--window must be at least 1."));
    }
    if !args.margin.is_finite() || args.margin < 0.0 || args.margin >= 100.0 {
        return Err(AppError::config("--margin must be a percentage in [0, 100)."));
    }
    if args.lookback_days < 0 {
        return Err(AppError::config("--lookback-days must not be negative."));
    }
    if args.uma_manual.is_some_and(|v| !v.is_finite() || v <= 0.0) {
        return Err(AppError::config("--uma-manual must be a positive number."));
    }

    Ok(ReportConfig {
        asof: args.calendar.asof.unwrap_or_else(today_mexico_city),
        business_days: args.calendar.days,
        lookback_days: args.lookback_days,
        smoothing_window: args.window,
        margin_pct: args.margin,
        uma_manual: args.uma_manual,
        raw_last_n: args.last_n,
        out_dir: args.out.clone(),
        write_raw: args.raw,
        export_json: args.json.clone(),
        fred_series: args.fred.clone(),
    })
}

/// Write the sheet CSVs and the JSON export requested in `config`.
pub fn write_outputs(report: &IndicatorReport, config: &ReportConfig) -> Result<(), AppError> {
    match &config.out_dir {
        Some(dir) => write_sheets(report, config, dir)?,
        None if config.write_raw => warn!("--raw ignored without --out"),
        None => {}
    }

    if let Some(path) = &config.export_json {
        write_report_json(path, report)?;
        info!(path = %path.display(), "wrote report JSON");
    }
    Ok(())
}

fn write_sheets(report: &IndicatorReport, config: &ReportConfig, dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::config(format!("Failed to create output directory '{}': {e}", dir.display())))?;

    write_layout_csv(&dir.join(SHEET_FILE), report)?;
    if config.write_raw {
        write_raw_csv(&dir.join(RAW_FILE), report)?;
    }
    if let Some((series_id, points)) = &report.fred {
        write_fred_csv(&dir.join(FRED_FILE), series_id, points)?;
    }
    info!(dir = %dir.display(), "wrote sheets");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::report::RawSeries;

    fn args(extra: &[&str]) -> ReportArgs {
        let mut argv = vec!["ratesheet", "report", "--asof", "2024-01-05"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Report(a) => a,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn report_config_maps_flags() {
        let config = report_config_from_args(&args(&["--days", "3", "--margin", "1.5", "--raw"])).unwrap();
        assert_eq!(config.asof, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(config.business_days, 3);
        assert_eq!(config.margin_pct, 1.5);
        assert!(config.write_raw);
    }

    #[test]
    fn invalid_flags_are_config_errors() {
        for extra in [
            &["--days", "0"][..],
            &["--days", "367"][..],
            &["--days", "18446744073709551615"][..],
            &["--window", "0"][..],
            &["--margin=-1"][..],
            &["--uma-manual", "0"][..],
        ] {
            let err = report_config_from_args(&args(extra)).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{extra:?}");
        }
    }

    #[test]
    fn days_upper_bound_is_inclusive() {
        let config = report_config_from_args(&args(&["--days", "366"])).unwrap();
        assert_eq!(config.business_days, MAX_BUSINESS_DAYS);
    }

    #[test]
    fn outputs_land_in_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sheets");
        let json = dir.path().join("report.json");
        let mut config = report_config_from_args(&args(&["--raw"])).unwrap();
        config.out_dir = Some(out.clone());
        config.export_json = Some(json.clone());

        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let report = IndicatorReport {
            asof: d,
            dates: vec![d],
            rows: Vec::new(),
            uma: None,
            raw: vec![RawSeries {
                label: "UDIS".to_string(),
                series_id: "SP68257".to_string(),
                points: vec![(d, 8.2)],
                dropped: 0,
                conflicts: Vec::new(),
            }],
            fred: Some(("DGS10".to_string(), vec![(d, 4.05)])),
        };
        write_outputs(&report, &config).unwrap();

        assert!(out.join(SHEET_FILE).is_file());
        assert!(out.join(RAW_FILE).is_file());
        assert!(out.join(FRED_FILE).is_file());
        assert!(json.is_file());
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert_eq!(init_logging("loud").unwrap_err().exit_code(), 2);
    }
}
