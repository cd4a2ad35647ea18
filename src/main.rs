//! CLI entry point for the port congestion risk tool.
//!
//! Provides subcommands for cleaning raw AIS data, building the per-port
//! time-series table, listing ports, and reporting a port's latest risk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use port_risk::cache::TableCache;
use port_risk::config::PipelineConfig;
use port_risk::features::{build, build_concurrent};
use port_risk::ingest::{load_ais, load_ports, load_raw_ais, write_ais};
use port_risk::monitor::{DEFAULT_ALERT_THRESHOLD, PortStatus, PortView, port_names};
use port_risk::output::{print_json, print_pretty, write_table};
use port_risk::scoring::{Classifier, ModelPayload, TrainingSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "port_risk")]
#[command(about = "Port congestion risk from AIS vessel positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and sort a raw AIS CSV file
    Ingest {
        /// Path to input AIS CSV file
        #[arg(short, long)]
        input: String,

        /// Path to output cleaned CSV file
        #[arg(short, long)]
        out: String,
    },
    /// Build the per-port time-series table from cleaned AIS and port definitions
    Build {
        /// Cleaned AIS CSV file
        #[arg(long)]
        ais: String,

        /// Port definitions CSV file
        #[arg(long)]
        ports: String,

        /// CSV file to write the table to
        #[arg(short, long, default_value = "data/processed/port_timeseries.csv")]
        out: String,

        /// Optional: JSON pipeline config file
        #[arg(long)]
        config: Option<String>,

        /// Time bin width in minutes (overrides config)
        #[arg(long)]
        bin_minutes: Option<i64>,

        /// Maximum number of ports aggregated concurrently (overrides config)
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
    /// List ports present in a time-series table
    Ports {
        /// Time-series table CSV file
        #[arg(short, long, default_value = "data/processed/port_timeseries.csv")]
        table: String,
    },
    /// Report the latest congestion features and risk score for a port
    Status {
        /// Time-series table CSV file
        #[arg(short, long, default_value = "data/processed/port_timeseries.csv")]
        table: String,

        /// Port name
        #[arg(short, long)]
        port: String,

        /// Model payload JSON file
        #[arg(short, long, default_value = "models/model.json")]
        model: String,

        /// Alert when the risk score (0-100) reaches this value
        #[arg(long, default_value_t = DEFAULT_ALERT_THRESHOLD)]
        threshold: f64,

        /// Number of most recent rows to log
        #[arg(long, default_value_t = 20)]
        tail: usize,

        /// Print the latest row as JSON instead of debug output
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let _log_guard = init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { input, out } => {
            let (points, report) = load_raw_ais(&input)
                .with_context(|| format!("Failed to ingest AIS from '{input}'"))?;
            write_ais(&out, &points)?;
            info!(
                out = %out,
                rows = report.kept_rows,
                dropped = report.dropped_rows,
                "Saved cleaned AIS"
            );
        }
        Commands::Build {
            ais,
            ports,
            out,
            config,
            bin_minutes,
            concurrency,
        } => {
            let config = match config {
                Some(path) => PipelineConfig::load(&path)
                    .with_context(|| format!("Failed to load config '{path}'"))?,
                None => PipelineConfig::default(),
            }
            .with_overrides(bin_minutes, concurrency);

            run_build(&ais, &ports, &out, &config).await?;
        }
        Commands::Ports { table } => {
            let mut cache = TableCache::new(&table);
            let rows = cache.get()?;
            let names = port_names(&rows);

            info!(total = names.len(), "Ports in table");
            for name in &names {
                info!(port = %name, "Port");
            }
        }
        Commands::Status {
            table,
            port,
            model,
            threshold,
            tail,
            json,
        } => {
            let mut cache = TableCache::new(&table);
            let rows = cache.get()?;
            report_status(&rows, &port, &model, threshold, tail, json)?;
        }
    }

    Ok(())
}

/// Installs the stderr and rolling JSON file layers.
///
/// The returned guard flushes the file writer on drop and must outlive `main`'s work.
fn init_tracing() -> Result<WorkerGuard> {
    let log_path = PathBuf::from(
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/port_risk.log".to_string()),
    );
    let log_dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_name = log_path
        .file_name()
        .unwrap_or(OsStr::new("port_risk.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

/// Loads inputs, builds the labeled table, and writes it to `out`.
#[tracing::instrument(skip(config), fields(bin_minutes = config.bin_minutes, concurrency = config.concurrency))]
async fn run_build(ais: &str, ports: &str, out: &str, config: &PipelineConfig) -> Result<()> {
    let width = config.bin_width()?;
    let ports = load_ports(ports).with_context(|| format!("Failed to load ports '{ports}'"))?;
    let points = load_ais(ais).with_context(|| format!("Failed to load AIS '{ais}'"))?;
    info!(points = points.len(), ports = ports.len(), "Inputs loaded");

    let table = if config.concurrency > 1 {
        build_concurrent(Arc::new(points), &ports, width, config.concurrency).await?
    } else {
        build(&points, &ports, width)?
    };

    let training = TrainingSet::from_rows(&table);
    if training.is_single_class() {
        warn!(
            rows = table.len(),
            positives = training.positives(),
            "Risk labels contain a single class; training should fall back to a constant model"
        );
    }

    write_table(out, &table)?;
    info!(out, rows = table.len(), "Saved port time series");
    Ok(())
}

/// Logs the latest row of `port`, its risk score, and the alert state.
fn report_status(
    rows: &[port_risk::features::PortTimeSeriesRow],
    port: &str,
    model_path: &str,
    threshold: f64,
    tail: usize,
    json: bool,
) -> Result<()> {
    let view = PortView::new(rows, port);

    let payload = match ModelPayload::load(model_path) {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(model = model_path, error = %e, "Model not loaded yet. Train first.");
            None
        }
    };
    let classifier = payload.as_ref().map(|p| &p.model as &dyn Classifier);

    match view.status(classifier, threshold) {
        PortStatus::Empty { port } => {
            warn!(port = %port, "No rows for selected port");
        }
        PortStatus::Ready(snapshot) => {
            match view.latest() {
                Some(latest) if json => print_json(latest)?,
                Some(latest) => print_pretty(latest),
                None => {}
            }
            for row in view.tail(tail) {
                info!(
                    tbin = %row.tbin,
                    vessels = row.vessels,
                    points = row.points,
                    mean_sog = row.mean_sog,
                    p10_sog = row.p10_sog,
                    anchored_ratio = row.anchored_ratio,
                    risk_label = row.risk_label,
                    "Row"
                );
            }

            info!(
                port = %snapshot.port,
                tbin = %snapshot.tbin,
                vessels = snapshot.vessels,
                anchored_ratio = snapshot.anchored_ratio,
                risk_score = ?snapshot.risk_score,
                "Latest"
            );

            match snapshot.alert {
                Some(true) => error!(
                    risk_score = ?snapshot.risk_score,
                    threshold,
                    "ALERT: congestion likelihood elevated"
                ),
                Some(false) => info!(threshold, "No alert, risk below threshold"),
                None => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use port_risk::features::PortTimeSeriesRow;

    #[test]
    fn test_status_json_flag_parses() {
        let cli = Cli::try_parse_from(["port_risk", "status", "--port", "Alpha", "--json"]).unwrap();

        match cli.command {
            Commands::Status { port, json, .. } => {
                assert_eq!(port, "Alpha");
                assert!(json);
            }
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn test_status_json_defaults_off() {
        let cli = Cli::try_parse_from(["port_risk", "status", "--port", "Alpha"]).unwrap();

        assert!(matches!(cli.command, Commands::Status { json: false, .. }));
    }

    #[test]
    fn test_report_status_json_without_model() {
        let rows = vec![create_row("Alpha", 0), create_row("Alpha", 30)];

        report_status(&rows, "Alpha", "/nonexistent/model.json", 70.0, 5, true).unwrap();
        report_status(&rows, "Bravo", "/nonexistent/model.json", 70.0, 5, true).unwrap();
    }

    // Helper functions for tests

    fn create_row(port: &str, minute: u32) -> PortTimeSeriesRow {
        PortTimeSeriesRow {
            tbin: Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap(),
            vessels: 2,
            points: 3,
            mean_sog: 3.5,
            p10_sog: 0.22,
            anchored_ratio: 0.5,
            port_name: port.to_string(),
            risk_label: 1,
        }
    }
}
