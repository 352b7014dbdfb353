//! Output formatters for samples.
//!
//! Every formatter is a pure function of a row and the output unit. The
//! header row renders column names for `human` and `csv`; `json` has no
//! header and renders nothing for it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::monitor::Sample;
use crate::size::{ByteSize, Unit};

/// Column names, in output order.
pub const COLUMNS: [&str; 6] = [
    "time",
    "pid",
    "peak_size",
    "current_size",
    "peak_resident",
    "current_resident",
];

/// Timestamp layout used by every format.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Csv,
    Json,
}

/// What a formatter is asked to render.
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Header,
    Sample(&'a Sample),
}

impl OutputFormat {
    /// Renders one line, or `None` when the format emits nothing for `row`.
    pub fn render(self, row: Row<'_>, unit: Unit) -> Result<Option<String>, serde_json::Error> {
        match self {
            OutputFormat::Human => Ok(Some(human(row, unit))),
            OutputFormat::Csv => Ok(Some(csv(row, unit))),
            OutputFormat::Json => json_line(row, unit),
        }
    }
}

fn cells(sample: &Sample, unit: Unit) -> [String; 6] {
    [
        sample.when.format(TIME_FORMAT).to_string(),
        sample.pid.to_string(),
        sample.peak_size.format(unit),
        sample.current_size.format(unit),
        sample.peak_resident.format(unit),
        sample.current_resident.format(unit),
    ]
}

fn human(row: Row<'_>, unit: Unit) -> String {
    let [time, pid, peak_size, current_size, peak_resident, current_resident] = match row {
        Row::Header => COLUMNS.map(str::to_string),
        Row::Sample(sample) => cells(sample, unit),
    };
    format!(
        "{time:<20} {pid:<15} {peak_size:<15} {current_size:<15} {peak_resident:<15} {current_resident:<15}"
    )
}

fn csv(row: Row<'_>, unit: Unit) -> String {
    match row {
        Row::Header => COLUMNS.join(","),
        Row::Sample(sample) => cells(sample, unit).join(","),
    }
}

/// Sizes are strings in auto mode (`"1.5MiB"`) and bare numbers otherwise.
fn size_value(size: ByteSize, unit: Unit) -> Value {
    let text = size.format(unit);
    if unit.is_auto() {
        return Value::String(text);
    }
    text.parse::<Number>()
        .map(Value::Number)
        .unwrap_or(Value::String(text))
}

/// Field order follows [`COLUMNS`].
#[derive(Serialize)]
struct JsonRow {
    time: String,
    pid: u32,
    peak_size: Value,
    current_size: Value,
    peak_resident: Value,
    current_resident: Value,
}

fn json_line(row: Row<'_>, unit: Unit) -> Result<Option<String>, serde_json::Error> {
    let Row::Sample(sample) = row else {
        return Ok(None);
    };

    let object = JsonRow {
        time: sample.when.format(TIME_FORMAT).to_string(),
        pid: sample.pid,
        peak_size: size_value(sample.peak_size, unit),
        current_size: size_value(sample.current_size, unit),
        peak_resident: size_value(sample.peak_resident, unit),
        current_resident: size_value(sample.current_resident, unit),
    };
    serde_json::to_string(&object).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn sample() -> Sample {
        Sample {
            when: Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap(),
            pid: 4242,
            peak_size: ByteSize::from_bytes(1_500_000),
            current_size: ByteSize::from_bytes(1_048_576),
            peak_resident: ByteSize::from_bytes(204_800),
            current_resident: ByteSize::from_bytes(2048),
        }
    }

    #[test]
    fn test_human_header_and_row() {
        let header = OutputFormat::Human.render(Row::Header, Unit::Auto).unwrap().unwrap();
        assert!(header.starts_with("time                 pid             peak_size"));
        assert_eq!(header.split_whitespace().collect::<Vec<_>>(), COLUMNS);

        let s = sample();
        let line = OutputFormat::Human.render(Row::Sample(&s), Unit::Auto).unwrap().unwrap();
        assert!(line.starts_with("2024-03-01 12:30:45  4242            1.431MiB"));
        assert_eq!(
            line.split_whitespace().skip(2).collect::<Vec<_>>(),
            vec!["4242", "1.431MiB", "1MiB", "200KiB", "2KiB"]
        );
    }

    #[test]
    fn test_csv_header_and_row() {
        assert_eq!(
            OutputFormat::Csv.render(Row::Header, Unit::Auto).unwrap().unwrap(),
            "time,pid,peak_size,current_size,peak_resident,current_resident"
        );

        let s = sample();
        assert_eq!(
            OutputFormat::Csv.render(Row::Sample(&s), Unit::KiB).unwrap().unwrap(),
            "2024-03-01 12:30:45,4242,1464.844,1024,200,2"
        );
    }

    #[test]
    fn test_json_has_no_header() {
        assert_eq!(OutputFormat::Json.render(Row::Header, Unit::Auto).unwrap(), None);
        assert_eq!(OutputFormat::Json.render(Row::Header, Unit::MiB).unwrap(), None);
    }

    #[test]
    fn test_json_auto_uses_strings() {
        let s = sample();
        let line = OutputFormat::Json.render(Row::Sample(&s), Unit::Auto).unwrap().unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["time"], "2024-03-01 12:30:45");
        assert_eq!(value["pid"], 4242);
        assert_eq!(value["peak_size"], "1.431MiB");
        assert_eq!(value["current_size"], "1MiB");
        assert_eq!(value["peak_resident"], "200KiB");
        assert_eq!(value["current_resident"], "2KiB");
    }

    #[test]
    fn test_json_explicit_unit_uses_numbers() {
        let s = sample();
        let line = OutputFormat::Json.render(Row::Sample(&s), Unit::KiB).unwrap().unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["peak_size"].as_f64(), Some(1464.844));
        assert_eq!(value["current_size"].as_u64(), Some(1024));
        assert_eq!(value["peak_resident"].as_u64(), Some(200));
        assert!(line.contains("\"peak_size\":1464.844"));
    }

    #[test]
    fn test_json_key_order_matches_columns() {
        let s = sample();
        let line = OutputFormat::Json.render(Row::Sample(&s), Unit::B).unwrap().unwrap();

        let positions: Vec<usize> = COLUMNS
            .iter()
            .map(|column| line.find(&format!("\"{column}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_json_keys() {
        let s = sample();
        let line = OutputFormat::Json.render(Row::Sample(&s), Unit::B).unwrap().unwrap();
        let value: Value = serde_json::from_str(&line).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), COLUMNS.len());
        for column in COLUMNS {
            assert!(object.contains_key(column), "missing key {column}");
        }
    }
}
