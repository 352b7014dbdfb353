//! Configuration management for pmon.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use pmon::{parse_duration, OutputFormat, Unit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cli::{Args, ConfigFormat, LogLevel};

// Default configuration constants
pub const DEFAULT_INTERVAL: &str = "1s";
pub const DEFAULT_LENGTH: &str = "5ms";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Config file locations tried in order when `--config` is not given.
const DEFAULT_CONFIG_PATHS: [&str; 7] = [
    "/etc/pmon/pmon.yaml",
    "/etc/pmon/pmon.yml",
    "/etc/pmon/pmon.json",
    "./pmon.yaml",
    "./pmon.yml",
    "./pmon.json",
    "./pmon.toml",
];

/// File-level configuration. Every field is optional so partial files merge
/// cleanly with defaults and CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub interval: Option<String>,
    pub length: Option<String>,
    pub format: Option<OutputFormat>,
    /// Empty means best fit
    pub unit: Option<String>,
    pub graph: Option<PathBuf>,
    pub cmd: Option<String>,
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
    pub pids: Option<Vec<u32>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Some(DEFAULT_INTERVAL.into()),
            length: Some(DEFAULT_LENGTH.into()),
            format: Some(OutputFormat::Human),
            unit: Some(String::new()),
            graph: None,
            cmd: None,
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            pids: None,
        }
    }
}

/// Validated, typed settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub interval: Duration,
    pub length: Duration,
    pub format: OutputFormat,
    pub unit: Unit,
    pub graph: Option<PathBuf>,
    pub cmd: Option<String>,
    pub log_level: LogLevel,
    pub pids: Vec<u32>,
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<Settings> {
    let interval_text = cfg.interval.as_deref().unwrap_or(DEFAULT_INTERVAL);
    let interval =
        parse_duration(interval_text).with_context(|| format!("invalid interval {interval_text}"))?;
    if interval.is_zero() {
        bail!("interval must be greater than zero");
    }

    let length_text = cfg.length.as_deref().unwrap_or(DEFAULT_LENGTH);
    let length =
        parse_duration(length_text).with_context(|| format!("invalid length {length_text}"))?;

    let unit_text = cfg.unit.as_deref().unwrap_or("");
    let unit = Unit::parse(unit_text).with_context(|| format!("invalid unit {unit_text}"))?;

    let level_text = cfg.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let log_level = LogLevel::from_str(level_text, true)
        .map_err(|e| anyhow::anyhow!("invalid log_level '{level_text}': {e}"))?;

    let pids = cfg.pids.clone().unwrap_or_default();
    if pids.contains(&0) {
        bail!("0 is not a valid process id");
    }

    if cfg.cmd.as_deref().is_some_and(|c| c.trim().is_empty()) {
        bail!("cmd is set but empty");
    }

    Ok(Settings {
        interval,
        length,
        format: cfg.format.unwrap_or_default(),
        unit,
        graph: cfg.graph.clone(),
        cmd: cfg.cmd.clone(),
        log_level,
        pids,
    })
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(interval) = &args.interval {
        config.interval = Some(interval.clone());
    }
    if let Some(length) = &args.length {
        config.length = Some(length.clone());
    }
    if let Some(format) = args.format {
        config.format = Some(format);
    }
    if let Some(unit) = &args.unit {
        config.unit = Some(unit.clone());
    }
    if let Some(graph) = &args.graph {
        config.graph = Some(graph.clone());
    }
    if let Some(cmd) = &args.cmd {
        config.cmd = Some(cmd.clone());
    }
    if let Some(level) = args.log_level {
        if let Some(value) = level.to_possible_value() {
            config.log_level = Some(value.get_name().to_string());
        }
    }

    // PIDs on the command line replace the configured list
    if !args.pids.is_empty() {
        config.pids = Some(args.pids.clone());
    }

    Ok(config)
}

/// Loads a config file, or the first default location that exists.
/// Missing files yield the default config.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => PathBuf::from(p),
        None => match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(found) => PathBuf::from(found),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => {
            // Default to YAML
            serde_yaml::from_str(&content)?
        }
    };
    info!("Loaded configuration from: {}", path.display());

    Ok(merge_defaults(loaded))
}

/// Fills fields the file left out with default values.
fn merge_defaults(loaded: Config) -> Config {
    let defaults = Config::default();
    Config {
        interval: loaded.interval.or(defaults.interval),
        length: loaded.length.or(defaults.length),
        format: loaded.format.or(defaults.format),
        unit: loaded.unit.or(defaults.unit),
        graph: loaded.graph.or(defaults.graph),
        cmd: loaded.cmd.or(defaults.cmd),
        log_level: loaded.log_level.or(defaults.log_level),
        pids: loaded.pids.or(defaults.pids),
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<()> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
