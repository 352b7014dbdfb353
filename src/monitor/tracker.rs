//! Per-process peak tracking and the samples it produces.

use chrono::{DateTime, Local};

use crate::process::MemoryRecord;
use crate::size::ByteSize;

/// One observation of a monitored process, rendered as one output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub when: DateTime<Local>,
    pub pid: u32,
    pub peak_size: ByteSize,
    pub current_size: ByteSize,
    pub peak_resident: ByteSize,
    pub current_resident: ByteSize,
}

/// A process in the monitored set together with its running peaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoredProcess {
    pid: u32,
    peak_size: ByteSize,
    peak_resident: ByteSize,
    alive: bool,
}

impl MonitoredProcess {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            peak_size: ByteSize::ZERO,
            peak_resident: ByteSize::ZERO,
            alive: true,
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn peak_size(&self) -> ByteSize {
        self.peak_size
    }

    pub fn peak_resident(&self) -> ByteSize {
        self.peak_resident
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Folds a fresh record into the peaks and returns the resulting sample.
    pub fn observe(&mut self, record: &MemoryRecord, when: DateTime<Local>) -> Sample {
        self.peak_size = self.peak_size.max(record.size);
        self.peak_resident = self.peak_resident.max(record.resident);

        Sample {
            when,
            pid: self.pid,
            peak_size: self.peak_size,
            current_size: record.size,
            peak_resident: self.peak_resident,
            current_resident: record.resident,
        }
    }

    /// Marks the process for removal at the end of the current pass.
    pub fn mark_dead(&mut self) {
        self.alive = false;
    }
}

/// Splits a pass's processes into survivors and the pids to evict.
///
/// Survivors keep their original order.
pub fn prune(processes: Vec<MonitoredProcess>) -> (Vec<MonitoredProcess>, Vec<u32>) {
    let (live, dead): (Vec<_>, Vec<_>) = processes.into_iter().partition(|p| p.alive);
    (live, dead.into_iter().map(|p| p.pid).collect())
}
