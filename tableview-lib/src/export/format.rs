//! Display formatting for numbers and rates.
//!
//! These helpers only shape strings. Sorting and filtering always run on the
//! raw numbers; the one exception is [`normalize_rate`], which is applied
//! both when a rate is displayed and when it is sorted so the two agree.

/// Sentinel written for missing values.
pub const NA: &str = "N/A";

const MAGNITUDES: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

/// Formats a number with a magnitude suffix.
///
/// ```
/// use tableview_lib::export::format_compact;
///
/// assert_eq!(format_compact(12_345.0), "12.3K");
/// assert_eq!(format_compact(1_250_000.0), "1.3M");
/// assert_eq!(format_compact(950.0), "950");
/// ```
pub fn format_compact(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();

    // Walk from the smallest unit up so 999_950 rounds into "1.0M", not "1000.0K".
    let mut chosen: Option<(f64, &str)> = None;
    for &(divisor, suffix) in MAGNITUDES.iter().rev() {
        if abs >= divisor || chosen.is_some_and(|(scaled, _)| scaled >= 1000.0) {
            chosen = Some((round_one(abs / divisor), suffix));
        }
    }

    match chosen {
        Some((scaled, suffix)) => format!("{}{:.1}{}", sign, scaled, suffix),
        None => format_plain(value),
    }
}

/// Formats a number without a suffix: integers as-is, fractions to 2 places.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Normalizes a rate that may arrive as a fraction or as a percentage.
///
/// Values below 1 are fractions and are scaled by 100; anything else is
/// already a percentage.
///
/// ```
/// use tableview_lib::export::normalize_rate;
///
/// assert_eq!(normalize_rate(0.0832), 8.32);
/// assert_eq!(normalize_rate(8.32), 8.32);
/// ```
pub fn normalize_rate(raw: f64) -> f64 {
    let scaled = if raw < 1.0 { raw * 100.0 } else { raw };
    (scaled * 1e10).round() / 1e10
}

/// Formats a rate as a percentage string, e.g. `"8.32%"`.
pub fn format_rate(raw: f64) -> String {
    format!("{:.2}%", normalize_rate(raw))
}

/// Rounds half away from zero at one decimal. `format!("{:.1}")` rounds
/// ties to even, which would print 1.25M as "1.2M".
fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_magnitudes() {
        assert_eq!(format_compact(0.0), "0");
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(1_000.0), "1.0K");
        assert_eq!(format_compact(12_345.0), "12.3K");
        assert_eq!(format_compact(1_250_000.0), "1.3M");
        assert_eq!(format_compact(3_400_000_000.0), "3.4B");
        assert_eq!(format_compact(-12_345.0), "-12.3K");
    }

    #[test]
    fn test_compact_rounds_into_next_unit() {
        assert_eq!(format_compact(999_950.0), "1.0M");
        assert_eq!(format_compact(999_940.0), "999.9K");
    }

    #[test]
    fn test_plain() {
        assert_eq!(format_plain(42.0), "42");
        assert_eq!(format_plain(4.256), "4.26");
    }

    #[test]
    fn test_normalize_rate() {
        assert_eq!(normalize_rate(0.0832), 8.32);
        assert_eq!(normalize_rate(8.32), 8.32);
        assert_eq!(normalize_rate(0.5), 50.0);
        assert_eq!(normalize_rate(1.0), 1.0);
        assert_eq!(normalize_rate(normalize_rate(0.0832)), 8.32);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0832), "8.32%");
        assert_eq!(format_rate(12.0), "12.00%");
    }
}
