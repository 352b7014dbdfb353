//! Byte quantities with binary unit parsing, conversion and formatting.
//!
//! A [`ByteSize`] always holds a whole number of bytes. Units only come into
//! play when a value is parsed from text or rendered for output, so no
//! precision is lost by converting back and forth.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing units and sizes from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeError {
    #[error("invalid unit \"{0}\"")]
    InvalidUnit(String),

    #[error("invalid numeral \"{numeral}\" in \"{input}\"")]
    InvalidNumeral { numeral: String, input: String },
}

/// Output unit. `Auto` picks the best-fit unit per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    #[default]
    Auto,
    B,
    KiB,
    MiB,
    GiB,
    TiB,
    PiB,
    EiB,
}

/// Concrete units from smallest to largest.
const LADDER: [Unit; 7] = [
    Unit::B,
    Unit::KiB,
    Unit::MiB,
    Unit::GiB,
    Unit::TiB,
    Unit::PiB,
    Unit::EiB,
];

impl Unit {
    /// Number of bytes in one of this unit, `None` for `Auto`.
    pub const fn bytes(self) -> Option<u64> {
        match self {
            Unit::Auto => None,
            Unit::B => Some(1),
            Unit::KiB => Some(1 << 10),
            Unit::MiB => Some(1 << 20),
            Unit::GiB => Some(1 << 30),
            Unit::TiB => Some(1 << 40),
            Unit::PiB => Some(1 << 50),
            Unit::EiB => Some(1 << 60),
        }
    }

    /// Canonical symbol, empty for `Auto`.
    pub const fn suffix(self) -> &'static str {
        match self {
            Unit::Auto => "",
            Unit::B => "B",
            Unit::KiB => "KiB",
            Unit::MiB => "MiB",
            Unit::GiB => "GiB",
            Unit::TiB => "TiB",
            Unit::PiB => "PiB",
            Unit::EiB => "EiB",
        }
    }

    pub const fn is_auto(self) -> bool {
        matches!(self, Unit::Auto)
    }

    /// Parses a unit symbol, ignoring case and surrounding whitespace.
    ///
    /// Short forms such as `k`, `kb` and `mb` are binary (KiB, KiB, MiB).
    /// The empty string maps to [`Unit::Auto`].
    pub fn parse(text: &str) -> Result<Self, SizeError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(Unit::Auto),
            "b" => Ok(Unit::B),
            "k" | "kb" | "kib" => Ok(Unit::KiB),
            "m" | "mb" | "mib" => Ok(Unit::MiB),
            "g" | "gb" | "gib" => Ok(Unit::GiB),
            "t" | "tb" | "tib" => Ok(Unit::TiB),
            "p" | "pb" | "pib" => Ok(Unit::PiB),
            "e" | "eb" | "eib" => Ok(Unit::EiB),
            _ => Err(SizeError::InvalidUnit(text.to_string())),
        }
    }
}

impl FromStr for Unit {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Auto => f.write_str("auto"),
            unit => f.write_str(unit.suffix()),
        }
    }
}

/// An unsigned number of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const ZERO: ByteSize = ByteSize(0);

    pub const fn from_bytes(bytes: u64) -> Self {
        ByteSize(bytes)
    }

    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Largest unit whose next step up would truncate the value to zero.
    ///
    /// Values of one EiB or more fall back to EiB.
    pub fn best_fit_unit(self) -> Unit {
        LADDER
            .windows(2)
            .find(|pair| match pair[1].bytes() {
                Some(next) => self.0 / next == 0,
                None => false,
            })
            .map(|pair| pair[0])
            .unwrap_or(Unit::EiB)
    }

    /// Value expressed in `unit`. `Auto` resolves to the best-fit unit.
    pub fn in_unit(self, unit: Unit) -> f64 {
        let unit = self.resolve(unit);
        let divisor = unit.bytes().unwrap_or(1);
        self.0 as f64 / divisor as f64
    }

    /// Renders the value for output.
    ///
    /// With `Auto` the best-fit unit is chosen and appended as a suffix
    /// (`1MiB`, `1.5KiB`), using up to four significant digits. With an
    /// explicit unit only the number is rendered: a plain integer when the
    /// value divides evenly, otherwise three decimals.
    pub fn format(self, unit: Unit) -> String {
        match unit.bytes() {
            None => {
                let fit = self.best_fit_unit();
                format!(
                    "{}{}",
                    format_significant(self.in_unit(fit), 4),
                    fit.suffix()
                )
            }
            Some(divisor) if self.0 % divisor == 0 => (self.0 / divisor).to_string(),
            Some(_) => format!("{:.3}", self.in_unit(unit)),
        }
    }

    /// Parses text such as `512`, `5m`, `2.5 GiB` or `10kb`.
    ///
    /// The numeral may carry a sign and a fractional part; a missing unit is
    /// read as bytes. Fractions of a byte are truncated.
    pub fn parse(text: &str) -> Result<Self, SizeError> {
        let trimmed = text.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
            .unwrap_or(trimmed.len());
        let (numeral, suffix) = trimmed.split_at(split);

        let invalid_numeral = || SizeError::InvalidNumeral {
            numeral: numeral.to_string(),
            input: text.to_string(),
        };

        let value: f64 = numeral.parse().map_err(|_| invalid_numeral())?;
        let unit = Unit::parse(suffix.trim())?;

        let bytes = value * unit.bytes().unwrap_or(1) as f64;
        if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
            return Err(invalid_numeral());
        }

        Ok(ByteSize(bytes as u64))
    }

    fn resolve(self, unit: Unit) -> Unit {
        if unit.is_auto() {
            self.best_fit_unit()
        } else {
            unit
        }
    }
}

impl From<u64> for ByteSize {
    fn from(bytes: u64) -> Self {
        ByteSize(bytes)
    }
}

impl FromStr for ByteSize {
    type Err = SizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ByteSize::parse(s)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Unit::Auto))
    }
}

/// Formats `value` with at most `digits` significant digits, dropping
/// trailing zeros after the decimal point.
fn format_significant(value: f64, digits: i32) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }

    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);

    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
