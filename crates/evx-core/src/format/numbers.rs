const THOUSAND: f64 = 1_000.0;
const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// Largest precision `to_fixed` renders; larger requests are clamped.
const MAX_FRACTION_DIGITS: usize = 100;

/// Above this magnitude every `f64` is already an integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

const BYTE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats `value` with at most `max_fraction_digits` decimals, trailing
/// zeros dropped and thousands grouped with commas: `1234.5 -> "1,234.5"`.
pub(crate) fn format_grouped(value: f64, max_fraction_digits: usize) -> String {
    let fixed = to_fixed(value, max_fraction_digits);
    let fixed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };

    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) if rest.chars().any(|c| c != '0' && c != '.') => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", fixed),
    };
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut out = String::with_capacity(fixed.len() + integer.len() / 3);
    out.push_str(sign);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Fixed-point rendering with halves rounded away from zero.
///
/// `fraction_digits` is clamped to [`MAX_FRACTION_DIGITS`].
pub(crate) fn to_fixed(value: f64, fraction_digits: usize) -> String {
    let fraction_digits = fraction_digits.min(MAX_FRACTION_DIGITS);
    let factor = 10f64.powi(fraction_digits as i32);
    let scaled = value * factor;
    let rounded = if scaled.abs() < EXACT_INTEGER_LIMIT {
        scaled.round() / factor
    } else {
        value
    };
    format!("{rounded:.fraction_digits$}")
}

/// Scales a byte count through decimal units (1 KB = 1000 B).
///
/// `999 -> "999 B"`, `1000 -> "1 KB"`, `1_234_567 -> "1.23 MB"`.
pub fn format_bytes_base10(bytes: f64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value >= THOUSAND && unit < BYTE_UNITS.len() - 1 {
        value /= THOUSAND;
        unit += 1;
    }
    format!("{} {}", format_grouped(value, 2), BYTE_UNITS[unit])
}

/// Short form with a `B`/`M`/`K` suffix and a fixed number of decimals.
pub fn display_number(n: f64, fraction_digits: usize) -> String {
    if n >= BILLION {
        format!("{}B", to_fixed(n / BILLION, fraction_digits))
    } else if n >= MILLION {
        format!("{}M", to_fixed(n / MILLION, fraction_digits))
    } else if n >= THOUSAND {
        format!("{}K", to_fixed(n / THOUSAND, fraction_digits))
    } else {
        to_fixed(n, fraction_digits)
    }
}

/// Like [`display_number`] but keeps up to two decimals and drops trailing
/// zeros.
pub fn abbreviate_usage_number(n: f64) -> String {
    if n >= BILLION {
        format!("{}B", format_grouped(n / BILLION, 2))
    } else if n >= MILLION {
        format!("{}M", format_grouped(n / MILLION, 2))
    } else if n >= THOUSAND {
        format!("{}K", format_grouped(n / THOUSAND, 2))
    } else {
        format_grouped(n, 2)
    }
}

/// Renders a ratio as a percentage: `0.1234 -> "12.34%"`.
pub fn format_percentage(ratio: f64, max_fraction_digits: usize) -> String {
    format!("{}%", format_grouped(ratio * 100.0, max_fraction_digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0, 2), "0");
        assert_eq!(format_grouped(999.0, 2), "999");
        assert_eq!(format_grouped(1234.5, 2), "1,234.5");
        assert_eq!(format_grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_grouped(12.0, 0), "12");
        assert_eq!(format_grouped(-1500.25, 1), "-1,500.3");
        assert_eq!(format_grouped(-0.001, 1), "0");
    }

    #[test]
    fn test_byte_boundaries() {
        assert_eq!(format_bytes_base10(0.0), "0 B");
        assert_eq!(format_bytes_base10(999.0), "999 B");
        assert_eq!(format_bytes_base10(1000.0), "1 KB");
        assert_eq!(format_bytes_base10(1_234_567.0), "1.23 MB");
        assert_eq!(format_bytes_base10(5e9), "5 GB");
    }

    #[test]
    fn test_bytes_stop_at_largest_unit() {
        assert_eq!(format_bytes_base10(2e27), "2,000 YB");
    }

    #[test]
    fn test_display_number() {
        assert_eq!(display_number(999.0, 0), "999");
        assert_eq!(display_number(1_500.0, 1), "1.5K");
        assert_eq!(display_number(2_500_000.0, 0), "3M");
        assert_eq!(display_number(1_000_000_000.0, 2), "1.00B");
        assert_eq!(display_number(12.346, 2), "12.35");
    }

    #[test]
    fn test_display_number_clamps_huge_precision() {
        let text = display_number(1_500.0, 400);
        assert!(text.starts_with("1.5000"), "{text}");
        assert!(text.ends_with('K'));
        assert_eq!(text.len(), "1.".len() + MAX_FRACTION_DIGITS + "K".len());
        assert_eq!(to_fixed(2.5, 20), "2.50000000000000000000");
        assert_eq!(to_fixed(1e300, 2), format!("{:.2}", 1e300));
    }

    #[test]
    fn test_abbreviate_usage_number() {
        assert_eq!(abbreviate_usage_number(12.0), "12");
        assert_eq!(abbreviate_usage_number(1_000.0), "1K");
        assert_eq!(abbreviate_usage_number(1_234_000.0), "1.23M");
        assert_eq!(abbreviate_usage_number(3_500_000_000.0), "3.5B");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.1234, 2), "12.34%");
        assert_eq!(format_percentage(1.0, 0), "100%");
    }
}
