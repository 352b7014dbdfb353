//! CLI arguments for pmon.
//!
//! This module defines the command-line interface structure using the clap library.

use clap::{Parser, ValueEnum};
use pmon::OutputFormat;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "pmon",
    about = "Monitor process memory and output it in various formats",
    long_about = "Monitor process memory and output it in various formats.\n\n\
                  Samples /proc/<pid>/statm of every given process at a fixed interval and \
                  prints the current and peak virtual and resident sizes.",
    version,
    after_help = "Examples:\n\n  \
                  pmon -l 5m -u kb 8231\n\tmonitors 8231 for 5 mins showing memory in KiB.\n  \
                  pmon -l 1h30m5s -i 5s -f csv --cmd \"sleep 10\" 8231\n\truns 'sleep' and monitors \
                  it and 8231 for 1 hour 30 mins 5 sec\n\twith a 5 sec interval and formatting to CSV."
)]
pub struct Args {
    /// Process ids to monitor
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub pids: Vec<u32>,

    /// Interval between status checks (e.g. 500ms, 1s) [default: 1s]
    #[arg(short = 'i', long)]
    pub interval: Option<String>,

    /// Length of time to run (e.g. 5m, 1h30m5s) [default: 5ms]
    #[arg(short = 'l', long)]
    pub length: Option<String>,

    /// Output format [default: human]
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Unit such as 'MiB' or 'kB' (default is best fit)
    #[arg(short = 'u', long)]
    pub unit: Option<String>,

    /// Write an HTML chart of resident memory to this file when done
    #[arg(long)]
    pub graph: Option<PathBuf>,

    /// Run this command and monitor it; it is killed when pmon exits and its stdout is discarded
    #[arg(long)]
    pub cmd: Option<String>,

    /// Log level for diagnostics on stderr [default: warn]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}
