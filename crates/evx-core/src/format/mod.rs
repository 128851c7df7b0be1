//! Display formatting for billing quantities.
//!
//! Everything here is pure. The only failure is parsing an unknown unit type.

mod buckets;
mod numbers;
mod usage;

use std::fmt;
use std::str::FromStr;

pub use buckets::Buckets;
pub use numbers::{abbreviate_usage_number, display_number, format_bytes_base10, format_percentage};
pub use usage::{
    GIGABYTE, MILLISECONDS_IN_HOUR, RESERVED_BUDGET_QUANTITY, ReservedOptions, UNLIMITED,
    UNLIMITED_RESERVED, UsageOptions, format_reserved_with_units, format_usage_with_units,
};

/// Unit a billed quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitType {
    Bytes,
    /// Quantity is in milliseconds, displayed as hours.
    DurationHours,
    Count,
}

impl UnitType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Bytes => "bytes",
            UnitType::DurationHours => "durationHours",
            UnitType::Count => "count",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bytes" => Ok(UnitType::Bytes),
            "durationHours" => Ok(UnitType::DurationHours),
            "count" => Ok(UnitType::Count),
            other => Err(FormatError::UnknownUnitType(other.to_string())),
        }
    }
}

/// Errors from constructing formatters.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    UnknownUnitType(String),
    /// Bucket thresholds must be strictly ascending.
    UnsortedThresholds { previous: f64, next: f64 },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownUnitType(name) => write!(
                f,
                "Unknown unit type '{name}' (expected bytes, durationHours or count)"
            ),
            FormatError::UnsortedThresholds { previous, next } => write!(
                f,
                "Bucket thresholds must be ascending: {next} follows {previous}"
            ),
        }
    }
}

impl std::error::Error for FormatError {}
