//! Format command handlers.

use anyhow::Result;
use evx_core::format::{
    Buckets, ReservedOptions, UnitType, UsageOptions, abbreviate_usage_number, display_number,
    format_bytes_base10, format_percentage, format_reserved_with_units, format_usage_with_units,
};

/// Unit flags shared by `usage` and `reserved`.
#[derive(clap::Args, Debug, Clone)]
pub struct UnitArgs {
    /// Unit type: bytes, durationHours or count
    #[arg(long, value_name = "UNIT")]
    unit: String,

    /// Abbreviate large numbers (K, M, B)
    #[arg(long)]
    abbreviated: bool,

    /// Pick the byte unit from the magnitude instead of always using GB
    #[arg(long)]
    scale: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// `1.5K` with a fixed number of decimals
    Short,
    /// `1.5K` with trailing zeros dropped
    Abbreviated,
    /// Decimal byte units: `1.23 MB`
    Bytes,
    /// Ratio as a percentage: `0.5 -> 50%`
    Percent,
}

pub fn usage(quantity: f64, args: &UnitArgs) -> Result<()> {
    let unit: UnitType = args.unit.parse()?;
    let options = UsageOptions {
        is_abbreviated: args.abbreviated,
        use_unit_scaling: args.scale,
    };
    println!("{}", format_usage_with_units(quantity, unit, options));
    Ok(())
}

pub fn reserved(quantity: f64, args: &UnitArgs, gifted: bool) -> Result<()> {
    let unit: UnitType = args.unit.parse()?;
    let options = ReservedOptions {
        is_abbreviated: args.abbreviated,
        use_unit_scaling: args.scale,
        is_gifted: gifted,
    };
    println!("{}", format_reserved_with_units(quantity, unit, options));
    Ok(())
}

pub fn number(number: f64, digits: usize, style: NumberStyle) {
    let formatted = match style {
        NumberStyle::Short => display_number(number, digits),
        NumberStyle::Abbreviated => abbreviate_usage_number(number),
        NumberStyle::Bytes => format_bytes_base10(number),
        NumberStyle::Percent => format_percentage(number, digits),
    };
    println!("{formatted}");
}

pub fn bucket(
    value: f64,
    thresholds: Vec<(f64, String)>,
    none_label: &str,
    overflow_label: &str,
) -> Result<()> {
    let buckets = Buckets::new(thresholds, none_label, overflow_label)?;
    println!("{}", buckets.classify(value));
    Ok(())
}

/// Parses `N=LABEL` into a threshold pair.
pub fn parse_threshold(input: &str) -> Result<(f64, String), String> {
    let (bound, label) = input
        .split_once('=')
        .ok_or_else(|| format!("expected N=LABEL, got '{input}'"))?;
    let bound: f64 = bound
        .trim()
        .parse()
        .map_err(|err| format!("invalid threshold '{bound}': {err}"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing label in '{input}'"));
    }
    Ok((bound, label.to_string()))
}
