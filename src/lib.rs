//! pmon - process memory monitor
//!
//! This library samples `/proc/<pid>/statm` for a set of processes at a fixed
//! interval, tracks peak virtual and resident sizes per process and renders
//! each sample as human-readable text, CSV or JSON.
//!
//! # Features
//!
//! - **Byte sizes**: [`ByteSize`] keeps whole bytes and converts to binary
//!   units (KiB, MiB, ...) only for display
//! - **Sampling**: [`StatmReader`] decodes one statm record per call
//! - **Monitoring loop**: [`Monitor`] races ticks against a deadline and an
//!   interrupt, and drops processes that exit mid-run
//! - **Chart export**: [`chart::write_html`] plots the resident-size history
//!
//! # Usage
//!
//! ```rust,no_run
//! use pmon::{Monitor, MonitorConfig, OutputFormat, StatmReader, Unit};
//! use std::time::Duration;
//!
//! # async fn example() -> std::io::Result<()> {
//! let config = MonitorConfig {
//!     interval: Duration::from_millis(500),
//!     length: Duration::from_secs(5),
//!     format: OutputFormat::Csv,
//!     unit: Unit::MiB,
//!     record_history: false,
//! };
//!
//! let monitor = Monitor::new(config, StatmReader::new(), &[std::process::id()]);
//! let interrupt = async {
//!     let _ = tokio::signal::ctrl_c().await;
//! };
//! let report = monitor.run(std::io::stdout(), interrupt).await?;
//! println!("stopped: {:?}", report.reason);
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod duration;
pub mod history;
pub mod monitor;
pub mod output;
pub mod process;
pub mod size;

// Re-export main types for convenience
pub use duration::{parse_duration, DurationError};
pub use history::History;
pub use monitor::{Monitor, MonitorConfig, Phase, RunReport, Sample, StopReason};
pub use output::{OutputFormat, Row};
pub use process::{MemoryRecord, SampleError, StatmReader};
pub use size::{ByteSize, SizeError, Unit};
