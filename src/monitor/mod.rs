//! The sampling loop.
//!
//! A [`Monitor`] owns the monitored processes and walks through
//! `Idle -> Running -> Draining -> Stopped`. While running it waits on the
//! [`EventSource`] race: each tick samples every live process in pid-list
//! order, writes one row per process and prunes the processes that could not
//! be sampled. The deadline, an interrupt or an exhausted process set end the
//! run.

pub mod event;
pub mod tracker;

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, instrument, warn};

use crate::history::History;
use crate::output::{OutputFormat, Row};
use crate::process::StatmReader;
use crate::size::Unit;

pub use event::{Event, EventSource, Interrupt};
pub use tracker::{prune, MonitoredProcess, Sample};

/// Default time between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Default total run length.
pub const DEFAULT_LENGTH: Duration = Duration::from_millis(5);

/// Settings for one monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub length: Duration,
    pub format: OutputFormat,
    pub unit: Unit,
    /// Keep a resident-size history for the chart export.
    pub record_history: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            length: DEFAULT_LENGTH,
            format: OutputFormat::default(),
            unit: Unit::Auto,
            record_history: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Draining,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    Interrupted,
    /// Every monitored process has gone away.
    Exhausted,
}

/// Result of one sampling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub emitted: usize,
    pub evicted: Vec<u32>,
}

/// Summary handed back when the loop stops.
#[derive(Debug)]
pub struct RunReport {
    pub reason: StopReason,
    pub ticks: u64,
    pub samples: u64,
    pub evicted: Vec<u32>,
    pub history: Option<History>,
}

pub struct Monitor {
    config: MonitorConfig,
    reader: StatmReader,
    processes: Vec<MonitoredProcess>,
    phase: Phase,
    stop_reason: Option<StopReason>,
    history: Option<History>,
    ticks: u64,
    samples: u64,
    evicted: Vec<u32>,
}

impl Monitor {
    /// Creates an idle monitor. Duplicate pids are monitored once, at their
    /// first position.
    pub fn new(config: MonitorConfig, reader: StatmReader, pids: &[u32]) -> Self {
        let mut processes: Vec<MonitoredProcess> = Vec::with_capacity(pids.len());
        for &pid in pids {
            if processes.iter().any(|p| p.pid() == pid) {
                debug!("pid {} given more than once, monitoring it once", pid);
                continue;
            }
            processes.push(MonitoredProcess::new(pid));
        }

        let history = config
            .record_history
            .then(|| History::new(config.unit, pids));

        Self {
            config,
            reader,
            processes,
            phase: Phase::Idle,
            stop_reason: None,
            history,
            ticks: 0,
            samples: 0,
            evicted: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Pids still being monitored, in sampling order.
    pub fn pids(&self) -> Vec<u32> {
        self.processes.iter().map(MonitoredProcess::pid).collect()
    }

    pub fn processes(&self) -> &[MonitoredProcess] {
        &self.processes
    }

    /// Emits the header and enters `Running`. Does nothing unless idle.
    pub fn start<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if self.phase != Phase::Idle {
            return Ok(());
        }

        if let Some(header) = self.config.format.render(Row::Header, self.config.unit)? {
            writeln!(out, "{header}")?;
        }
        self.phase = Phase::Running;
        debug!(
            "Monitoring {} process(es): {:?}",
            self.processes.len(),
            self.pids()
        );
        Ok(())
    }

    /// Samples every monitored process once and prunes the ones that failed.
    ///
    /// A failure only affects its own process; the rest of the pass goes on.
    ///
    /// Does nothing unless the monitor is running.
    pub fn tick<W: Write>(&mut self, out: &mut W) -> io::Result<TickOutcome> {
        if self.phase != Phase::Running {
            debug!("Ignoring tick, monitor is {:?}", self.phase);
            return Ok(TickOutcome::default());
        }
        self.ticks += 1;
        let mut emitted = 0;

        for process in &mut self.processes {
            match self.reader.sample(process.pid()) {
                Ok(record) => {
                    let sample = process.observe(&record, Local::now());
                    let rendered = self
                        .config
                        .format
                        .render(Row::Sample(&sample), self.config.unit)?;
                    if let Some(line) = rendered {
                        writeln!(out, "{line}")?;
                    }
                    if let Some(history) = self.history.as_mut() {
                        history.record(&sample);
                    }
                    emitted += 1;
                }
                Err(e) => {
                    warn!("{}", e);
                    process.mark_dead();
                }
            }
        }
        out.flush()?;

        let (live, evicted) = prune(std::mem::take(&mut self.processes));
        self.processes = live;
        if !evicted.is_empty() {
            info!(
                "Stopped monitoring {:?}, {} process(es) left",
                evicted,
                self.processes.len()
            );
            self.evicted.extend_from_slice(&evicted);
        }
        self.samples += emitted as u64;

        debug!("Tick {} emitted {} sample(s)", self.ticks, emitted);
        Ok(TickOutcome { emitted, evicted })
    }

    /// Moves to `Draining`, flushes pending output and settles in `Stopped`.
    ///
    /// Returns `false` when the monitor was already stopping; later
    /// triggers are ignored.
    pub fn stop<W: Write>(&mut self, reason: StopReason, out: &mut W) -> io::Result<bool> {
        if matches!(self.phase, Phase::Draining | Phase::Stopped) {
            debug!("Ignoring {:?}, monitor is already {:?}", reason, self.phase);
            return Ok(false);
        }

        self.phase = Phase::Draining;
        self.stop_reason = Some(reason);
        out.flush()?;
        self.phase = Phase::Stopped;

        info!(
            "Monitoring stopped ({:?}) after {} tick(s), {} sample(s)",
            reason, self.ticks, self.samples
        );
        Ok(true)
    }

    /// Runs until the deadline, an interrupt or until no process is left.
    ///
    /// The first tick fires immediately; each later tick is scheduled one
    /// interval after the previous pass finished.
    #[instrument(skip_all, fields(interval = ?self.config.interval, length = ?self.config.length))]
    pub async fn run<W, F>(mut self, mut out: W, interrupt: F) -> io::Result<RunReport>
    where
        W: Write + Send,
        F: Future<Output = ()> + Send + 'static,
    {
        let mut events = EventSource::new(self.config.interval, self.config.length, interrupt);
        self.start(&mut out)?;

        while self.phase == Phase::Running {
            match events.next().await {
                Event::Tick if self.processes.is_empty() => {
                    self.stop(StopReason::Exhausted, &mut out)?;
                }
                Event::Tick => {
                    self.tick(&mut out)?;
                    events.rearm();
                }
                Event::Deadline => {
                    self.stop(StopReason::Deadline, &mut out)?;
                }
                Event::Interrupt => {
                    self.stop(StopReason::Interrupted, &mut out)?;
                }
            }
        }

        Ok(self.into_report())
    }

    fn into_report(self) -> RunReport {
        RunReport {
            reason: self.stop_reason.unwrap_or(StopReason::Deadline),
            ticks: self.ticks,
            samples: self.samples,
            evicted: self.evicted,
            history: self.history,
        }
    }
}
