//! Parsing of interval and run-length literals such as `500ms` or `1h30m5s`.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// One `<number><unit>` group of a duration literal.
static COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.?\d*|\.\d+)(ns|us|µs|μs|ms|s|m|h)").expect("duration pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,

    #[error("negative duration \"{0}\"")]
    Negative(String),

    #[error("invalid duration \"{0}\" (expected e.g. 500ms, 5s, 1h30m)")]
    Invalid(String),

    #[error("duration \"{0}\" is out of range")]
    OutOfRange(String),
}

fn nanos_per_unit(unit: &str) -> f64 {
    match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        // only "h" is left after the regex
        _ => 3600e9,
    }
}

/// Parses a duration made of one or more `<number><unit>` groups.
///
/// Units are `ns`, `us`/`µs`, `ms`, `s`, `m` and `h`; numbers may be
/// fractional. A bare `0` is accepted without a unit.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if body.is_empty() {
        return Err(DurationError::Empty);
    }
    if body.starts_with('-') {
        return Err(DurationError::Negative(text.to_string()));
    }
    if body == "0" {
        return Ok(Duration::ZERO);
    }

    let mut position = 0;
    let mut total_nanos = 0.0_f64;

    for caps in COMPONENT.captures_iter(body) {
        let (Some(whole), Some(number), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            return Err(DurationError::Invalid(text.to_string()));
        };
        if whole.start() != position {
            return Err(DurationError::Invalid(text.to_string()));
        }
        position = whole.end();

        let value: f64 = number
            .as_str()
            .parse()
            .map_err(|_| DurationError::Invalid(text.to_string()))?;
        total_nanos += value * nanos_per_unit(unit.as_str());
    }

    if position == 0 || position != body.len() {
        return Err(DurationError::Invalid(text.to_string()));
    }
    if !total_nanos.is_finite() || total_nanos >= u64::MAX as f64 {
        return Err(DurationError::OutOfRange(text.to_string()));
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
