//! pmon - process memory monitor
//!
//! Entry point: resolves configuration, optionally spawns `--cmd`, runs the
//! monitoring loop on stdout and writes the chart when asked to.

mod child;
mod cli;
mod config;
mod startup_checks;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use pmon::{chart, Monitor, MonitorConfig, StatmReader};
use std::path::Path;
use tokio::signal;
use tracing::{error, info, level_filters::LevelFilter, warn};

use cli::{Args, LogLevel};
use config::{resolve_config, show_config, validate_effective_config, Settings};

/// Initializes tracing on stderr so stdout stays reserved for samples.
fn setup_logging(level: LogLevel) {
    let filter = match level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), stopping");
        }
        _ = terminate => {
            info!("Received SIGTERM, stopping");
        }
    }
}

async fn run(settings: Settings) -> Result<()> {
    let reader = StatmReader::new();
    if let Err(e) = startup_checks::validate_requirements(Path::new("/proc")) {
        warn!("Startup checks failed, continuing anyway: {}", e);
    }

    let mut pids = settings.pids.clone();
    let child = match settings.cmd.as_deref() {
        Some(cmdline) => {
            let child = child::spawn_command(cmdline)?;
            pids.push(child.pid());
            Some(child)
        }
        None => None,
    };

    let monitor_config = MonitorConfig {
        interval: settings.interval,
        length: settings.length,
        format: settings.format,
        unit: settings.unit,
        record_history: settings.graph.is_some(),
    };
    let monitor = Monitor::new(monitor_config, reader, &pids);

    let handle = tokio::spawn(monitor.run(std::io::stdout(), shutdown_signal()));
    let outcome = handle.await.context("monitoring task failed")?;

    if let Some(child) = child {
        child.shutdown();
    }

    let report = outcome.context("failed to write samples")?;
    info!(
        "Finished ({:?}): {} tick(s), {} sample(s), {} process(es) evicted",
        report.reason,
        report.ticks,
        report.samples,
        report.evicted.len()
    );

    if let (Some(path), Some(history)) = (settings.graph.as_deref(), report.history.as_ref()) {
        chart::write_html(history, path)
            .with_context(|| format!("failed to write chart to {}", path.display()))?;
        info!("Chart written to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if args.show_config {
        return show_config(&config, args.config_format);
    }

    if args.check_config {
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {e:#}");
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    let settings = validate_effective_config(&config)?;
    setup_logging(settings.log_level);

    if settings.pids.is_empty() && settings.cmd.is_none() {
        Args::command().print_help()?;
        return Ok(());
    }

    run(settings).await
}
