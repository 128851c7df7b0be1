use super::UnitType;
use super::numbers::{abbreviate_usage_number, display_number, format_bytes_base10, format_grouped};

pub const GIGABYTE: f64 = 1_000_000_000.0;
pub const MILLISECONDS_IN_HOUR: f64 = 3_600_000.0;

/// Reserved quantity of a budget-based plan with no fixed volume.
pub const RESERVED_BUDGET_QUANTITY: f64 = -2.0;
/// Reserved quantity of an unlimited plan.
pub const UNLIMITED_RESERVED: f64 = -1.0;
pub const UNLIMITED: &str = "Unlimited";

const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageOptions {
    pub is_abbreviated: bool,
    /// Scale bytes through KB, MB, GB... instead of always showing GB.
    pub use_unit_scaling: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReservedOptions {
    pub is_abbreviated: bool,
    pub use_unit_scaling: bool,
    /// Quantity is a promotional allotment.
    pub is_gifted: bool,
}

/// Formats a consumed quantity. Bytes are raw bytes, durations are
/// milliseconds.
pub fn format_usage_with_units(quantity: f64, unit: UnitType, options: UsageOptions) -> String {
    match unit {
        UnitType::Bytes => {
            if options.use_unit_scaling {
                return format_bytes_base10(quantity);
            }
            let gigabytes = quantity / GIGABYTE;
            if options.is_abbreviated {
                format!("{} GB", abbreviate_usage_number(gigabytes))
            } else {
                format!("{} GB", format_grouped(gigabytes, 2))
            }
        }
        UnitType::DurationHours => {
            let hours = quantity / MILLISECONDS_IN_HOUR;
            if hours == 0.0 {
                "0".to_string()
            } else if options.is_abbreviated {
                abbreviate_usage_number(hours)
            } else {
                format_grouped(hours, 1)
            }
        }
        UnitType::Count => {
            if options.is_abbreviated {
                abbreviate_usage_number(quantity)
            } else {
                format_grouped(quantity, 3)
            }
        }
    }
}

/// Formats a reserved (purchased) quantity. Byte reservations are in GB.
pub fn format_reserved_with_units(
    reserved: f64,
    unit: UnitType,
    options: ReservedOptions,
) -> String {
    if reserved == RESERVED_BUDGET_QUANTITY {
        return NOT_APPLICABLE.to_string();
    }

    let is_bytes = unit == UnitType::Bytes;
    if reserved == UNLIMITED_RESERVED {
        return match (options.is_gifted, is_bytes) {
            (false, _) => UNLIMITED.to_string(),
            (true, true) => "0 GB".to_string(),
            (true, false) => "0".to_string(),
        };
    }

    if !is_bytes {
        return if options.is_abbreviated {
            display_number(reserved, 0)
        } else {
            format_grouped(reserved, 1)
        };
    }

    if options.use_unit_scaling {
        return format_bytes_base10(reserved * GIGABYTE);
    }
    let amount = if options.is_abbreviated {
        display_number(reserved, 0)
    } else {
        format_grouped(reserved, 1)
    };
    format!("{amount} GB")
}
