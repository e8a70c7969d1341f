// =============================================================================
// Price Precision — magnitude-aware rounding and display formatting
// =============================================================================
//
// Asset prices span many orders of magnitude (sub-cent tokens to five-figure
// coins), so the number of meaningful decimals depends on the price itself:
//
//   |price| == 0        2 decimals
//   |price| <  0.01     8 decimals (scientific notation below 1e-6 when formatted)
//   |price| <  1        6 decimals
//   |price| <  1000     4 decimals
//   otherwise           2 decimals, thousands separators when formatted

/// Number of decimals appropriate for `price`.
pub fn price_precision(price: f64) -> u32 {
    let abs = price.abs();
    if abs == 0.0 || !abs.is_finite() {
        2
    } else if abs < 0.01 {
        8
    } else if abs < 1.0 {
        6
    } else if abs < 1000.0 {
        4
    } else {
        2
    }
}

/// Round `value` to `decimals` places (half away from zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Very large values overflow the scaled intermediate.
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Round `value` to the precision of `reference` (or of `value` itself).
pub fn round_to_precision(value: f64, reference: Option<f64>) -> f64 {
    round_to(value, price_precision(reference.unwrap_or(value)))
}

/// Human-readable USD price, e.g. `$0.00288026`, `$123.4560`, `$12,345.67`.
pub fn format_price(price: f64) -> String {
    let abs = price.abs();

    if abs == 0.0 || !abs.is_finite() {
        return "$0.00".to_string();
    }
    if abs < 0.000_001 {
        return format!("${:.2e}", price);
    }
    if abs < 0.01 {
        let full = format!("{:.8}", price);
        let trimmed = trim_zeros(&full);
        let decimals = trimmed.split('.').nth(1).map_or(0, str::len);
        return if decimals < 2 {
            format!("${full}")
        } else {
            format!("${trimmed}")
        };
    }
    if abs < 1.0 {
        return format!("${}", trim_zeros(&format!("{:.6}", price)));
    }
    if abs < 1000.0 {
        return format!("${:.4}", price);
    }
    format!("${}", group_thousands(&format!("{:.2}", price)))
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn group_thousands(s: &str) -> String {
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_tiers() {
        assert_eq!(price_precision(0.0), 2);
        assert_eq!(price_precision(0.000_000_123), 8);
        assert_eq!(price_precision(0.002_88), 8);
        assert_eq!(price_precision(0.123_456), 6);
        assert_eq!(price_precision(1.0), 4);
        assert_eq!(price_precision(999.99), 4);
        assert_eq!(price_precision(1000.0), 2);
        assert_eq!(price_precision(-0.5), 6);
    }

    #[test]
    fn rounding_follows_reference() {
        assert_eq!(round_to_precision(123.456_789, None), 123.4568);
        assert_eq!(round_to_precision(0.123_456_789, None), 0.123457);
        assert_eq!(round_to_precision(12_345.678, None), 12_345.68);
        // Band width of a sub-cent asset keeps the asset's precision.
        assert_eq!(round_to_precision(1.234_567_89, Some(0.005)), 1.23456789);
        assert_eq!(round_to(66.666_666, 2), 66.67);
        assert_eq!(round_to(-2.345, 1), -2.3);
    }

    #[test]
    fn formatting_tiers() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(0.000_000_123), "$1.23e-7");
        assert_eq!(format_price(0.002_880_26), "$0.00288026");
        assert_eq!(format_price(0.000_123_4), "$0.0001234");
        assert_eq!(format_price(0.123_456), "$0.123456");
        assert_eq!(format_price(0.5), "$0.5");
        assert_eq!(format_price(1.234_56), "$1.2346");
        assert_eq!(format_price(123.456), "$123.4560");
        assert_eq!(format_price(12_345.67), "$12,345.67");
        assert_eq!(format_price(1_234_567.891), "$1,234,567.89");
    }

    #[test]
    fn thousands_grouping_handles_sign() {
        assert_eq!(group_thousands("-1234567.50"), "-1,234,567.50");
        assert_eq!(group_thousands("999.00"), "999.00");
        assert_eq!(group_thousands("100000"), "100,000");
    }
}
