//! Centralized number formatting utilities.
//!
//! Price values shown in entries go through this module so that every result
//! uses the same precision rules, and to support European-style number
//! formatting (swapping `.` and `,`).

/// Apply European number format by swapping `.` and `,` in a formatted string.
fn europeanize(s: &str) -> String {
    // Formatted strings are purely numeric (with optional K/M/c suffix), so a
    // global swap is safe.
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

/// Apply European formatting conditionally.
#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a large f64 number with K/M suffix for compact display.
///
/// - Values >= 1,000,000 are formatted as `X.XXM`
/// - Values >= 1,000 are formatted as `X.XXK`
/// - Values below 1,000 are rounded to an integer
///
/// # Examples
/// ```
/// use pricelens_types::formatting::format_compact_f64;
/// assert_eq!(format_compact_f64(500.0, false), "500");
/// assert_eq!(format_compact_f64(1_500.0, false), "1.50K");
/// assert_eq!(format_compact_f64(1_500_000.0, false), "1.50M");
/// assert_eq!(format_compact_f64(1_500.0, true), "1,50K");
/// ```
pub fn format_compact_f64(n: f64, european: bool) -> String {
    let n_abs = n.abs();
    let s = if n_abs >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n_abs >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    };
    maybe_eu(s, european)
}

/// Format a chaos orb value for a price entry.
///
/// Small values keep up to two decimals (trailing zeros dropped), values
/// from 10 upward are whole numbers, and values from 1,000 upward use the
/// compact K/M form.
///
/// # Examples
/// ```
/// use pricelens_types::formatting::format_chaos;
/// assert_eq!(format_chaos(0.25, false), "0.25c");
/// assert_eq!(format_chaos(1.0, false), "1c");
/// assert_eq!(format_chaos(2.5, true), "2,5c");
/// assert_eq!(format_chaos(187.4, false), "187c");
/// assert_eq!(format_chaos(15_250.0, false), "15.25Kc");
/// ```
pub fn format_chaos(value: f64, european: bool) -> String {
    if value.abs() >= 1_000.0 {
        return format!("{}c", format_compact_f64(value, european));
    }
    let s = if value.abs() >= 10.0 {
        format!("{:.0}", value)
    } else {
        let fixed = format!("{:.2}", value);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    format!("{}c", maybe_eu(s, european))
}

/// Format a value as a fraction of a divine orb.
///
/// Returns `None` when no positive exchange rate is known.
///
/// # Examples
/// ```
/// use pricelens_types::formatting::format_divine;
/// assert_eq!(format_divine(300.0, 200.0, false), Some("1.5div".to_string()));
/// assert_eq!(format_divine(300.0, 0.0, false), None);
/// ```
pub fn format_divine(chaos: f64, divine_rate: f64, european: bool) -> Option<String> {
    if divine_rate <= 0.0 {
        return None;
    }
    let fixed = format!("{:.1}", chaos / divine_rate);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.').to_string();
    Some(format!("{}div", maybe_eu(trimmed, european)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_europeanize_swaps_both_separators() {
        assert_eq!(europeanize("1,234.5"), "1.234,5");
    }

    #[test]
    fn test_format_chaos_negative_small_value() {
        assert_eq!(format_chaos(-0.5, false), "-0.5c");
    }

    #[test]
    fn test_format_chaos_large_value_is_compact() {
        assert_eq!(format_chaos(-2_000.0, true), "-2,00Kc");
        assert_eq!(format_chaos(999.6, false), "1000c");
    }

    #[test]
    fn test_format_chaos_zero() {
        assert_eq!(format_chaos(0.0, false), "0c");
    }

    #[test]
    fn test_format_divine_whole_number() {
        assert_eq!(format_divine(400.0, 200.0, true), Some("2div".to_string()));
    }
}
