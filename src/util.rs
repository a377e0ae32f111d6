// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" spreadsheet cell handling so the rest
// of the code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a cell into `f64` while being forgiving about formatting issues that
/// are common in spreadsheet exports (commas, spaces, text).
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Quantity cells: missing, negative or unparseable values count as zero.
/// Fractional values are rounded to the nearest piece.
pub fn parse_qty(s: Option<&str>) -> u64 {
    match parse_f64_safe(s) {
        Some(v) if v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

/// Unit price cells follow the same zero-fill policy as quantities.
pub fn parse_cash(s: Option<&str>) -> f64 {
    match parse_f64_safe(s) {
        Some(v) if v > 0.0 => v,
        _ => 0.0,
    }
}

/// Grouping keys are compared trimmed and upper-cased.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_uppercase()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// `numerator / denominator * 100`, or 0 when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let pct = numerator / denominator * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Beyond u128 the digits are printed without separators.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qty_zero_fills_bad_cells() {
        assert_eq!(parse_qty(Some(" 12 ")), 12);
        assert_eq!(parse_qty(Some("1,250")), 1250);
        assert_eq!(parse_qty(Some("4.6")), 5);
        assert_eq!(parse_qty(Some("-3")), 0);
        assert_eq!(parse_qty(Some("")), 0);
        assert_eq!(parse_qty(Some("n/a")), 0);
        assert_eq!(parse_qty(None), 0);
    }

    #[test]
    fn cash_zero_fills_bad_cells() {
        assert_eq!(parse_cash(Some("199.90")), 199.90);
        assert_eq!(parse_cash(Some("-1")), 0.0);
        assert_eq!(parse_cash(None), 0.0);
    }

    #[test]
    fn percent_is_total() {
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(percent(0.0, 0.0), 0.0);
        assert_eq!(percent(1.0, 4.0), 25.0);
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[100.0, 50.0]), 75.0);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_int(9855u64), "9,855");
    }

    #[test]
    fn large_values_keep_their_digits() {
        assert_eq!(format_number(2.0e19, 2), "20,000,000,000,000,000,000.00");
        assert_eq!(format_number(-1.8446744073709552e19, 0), "-18,446,744,073,709,551,616");
        let huge = format_number(1.0e40, 0);
        assert!(huge.starts_with("10000000000000000"));
        assert_eq!(huge.len(), 41);
    }

    #[test]
    fn oversized_qty_clamps_to_max() {
        assert_eq!(parse_qty(Some("99999999999999999999")), u64::MAX);
    }

    #[test]
    fn keys_are_trimmed_and_upper_cased() {
        assert_eq!(normalize_key("  bg "), "BG");
    }
}
