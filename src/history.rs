//! Collected resident-size series for the chart export.

use ahash::AHashMap as HashMap;
use chrono::{DateTime, Local};

use crate::monitor::Sample;
use crate::size::Unit;

/// Unit used for the chart when the output unit is `Auto`; a best-fit unit
/// per point would make the series incomparable.
pub const DEFAULT_CHART_UNIT: Unit = Unit::MiB;

/// Resident-size points of one process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub times: Vec<DateTime<Local>>,
    pub rss: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

/// Per-pid history of current resident size, in a fixed unit.
#[derive(Debug, Clone)]
pub struct History {
    unit: Unit,
    order: Vec<u32>,
    series: HashMap<u32, Series>,
    max: f64,
}

impl History {
    pub fn new(unit: Unit, pids: &[u32]) -> Self {
        let unit = if unit.is_auto() {
            DEFAULT_CHART_UNIT
        } else {
            unit
        };

        let mut history = Self {
            unit,
            order: Vec::with_capacity(pids.len()),
            series: HashMap::with_capacity(pids.len()),
            max: 0.0,
        };
        for &pid in pids {
            history.entry(pid);
        }
        history
    }

    fn entry(&mut self, pid: u32) -> &mut Series {
        if !self.series.contains_key(&pid) {
            self.order.push(pid);
        }
        self.series.entry(pid).or_default()
    }

    /// Appends the current resident size of `sample`.
    pub fn record(&mut self, sample: &Sample) {
        let value = sample.current_resident.in_unit(self.unit);
        self.max = self.max.max(value);

        let series = self.entry(sample.pid);
        series.times.push(sample.when);
        series.rss.push(value);
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Largest recorded value, in [`History::unit`].
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Total number of recorded points.
    pub fn len(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Series per pid, in the order pids were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Series)> + '_ {
        self.order
            .iter()
            .filter_map(|pid| self.series.get(pid).map(|series| (*pid, series)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::ByteSize;

    fn sample(pid: u32, resident: u64) -> Sample {
        Sample {
            when: Local::now(),
            pid,
            peak_size: ByteSize::ZERO,
            current_size: ByteSize::ZERO,
            peak_resident: ByteSize::from_bytes(resident),
            current_resident: ByteSize::from_bytes(resident),
        }
    }

    #[test]
    fn test_auto_unit_becomes_mib() {
        assert_eq!(History::new(Unit::Auto, &[]).unit(), Unit::MiB);
        assert_eq!(History::new(Unit::KiB, &[]).unit(), Unit::KiB);
    }

    #[test]
    fn test_record_converts_to_unit() {
        let mut history = History::new(Unit::MiB, &[5]);
        history.record(&sample(5, 3 << 20));
        history.record(&sample(5, 1 << 19));

        let (pid, series) = history.iter().next().unwrap();
        assert_eq!(pid, 5);
        assert_eq!(series.rss, vec![3.0, 0.5]);
        assert_eq!(history.max(), 3.0);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_iter_keeps_first_seen_order() {
        let mut history = History::new(Unit::KiB, &[9, 3]);
        history.record(&sample(3, 1024));
        history.record(&sample(7, 2048));
        history.record(&sample(9, 4096));

        let pids: Vec<u32> = history.iter().map(|(pid, _)| pid).collect();
        assert_eq!(pids, vec![9, 3, 7]);
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = History::new(Unit::Auto, &[1, 2]);
        assert!(history.is_empty());
        assert_eq!(history.iter().count(), 2);
    }
}
