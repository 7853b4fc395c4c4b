//! Decimal rendering of training metrics.
//!
//! Replay-proof hashes and the loss-history hash are computed over text, so
//! every party must render a given `f64` to exactly the same string. The
//! rendering is the shortest decimal that round-trips to the same value,
//! always carrying a fractional part (`1.0`, `0.82`). Magnitudes below `1e-4`
//! or at/above `1e16` switch to scientific notation with a signed, at least
//! two-digit exponent (`1e-05`, `1.5e+16`).

/// Below this magnitude values are rendered in scientific notation.
const SCIENTIFIC_BELOW: f64 = 1e-4;
/// At or above this magnitude values are rendered in scientific notation.
const SCIENTIFIC_FROM: f64 = 1e16;

/// Render a metric value as canonical decimal text.
pub fn format_decimal(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && (magnitude < SCIENTIFIC_BELOW || magnitude >= SCIENTIFIC_FROM) {
        let rendered = format!("{:e}", value);
        if let Some((mantissa, exponent)) = rendered.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return rendered;
    }

    let rendered = value.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

/// Round to `digits` decimal places.
///
/// The exact binary value is rounded in decimal (ties to even) and the
/// result re-parsed, so `round_to(0.123456, 4)` is the `f64` nearest `0.1235`.
pub fn round_to(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

/// Render each value with [`format_decimal`] and join with `separator`.
pub fn join_decimals(values: &[f64], separator: &str) -> String {
    values
        .iter()
        .map(|v| format_decimal(*v))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_values_unchanged() {
        assert_eq!(format_decimal(0.82), "0.82");
        assert_eq!(format_decimal(0.6543), "0.6543");
        assert_eq!(format_decimal(-2.5), "-2.5");
    }

    #[test]
    fn test_integral_values_keep_fraction() {
        assert_eq!(format_decimal(1.0), "1.0");
        assert_eq!(format_decimal(0.0), "0.0");
        assert_eq!(format_decimal(-0.0), "-0.0");
        assert_eq!(format_decimal(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_shortest_roundtrip() {
        assert_eq!(format_decimal(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_small_values_scientific() {
        assert_eq!(format_decimal(1e-5), "1e-05");
        assert_eq!(format_decimal(2.5e-7), "2.5e-07");
        assert_eq!(format_decimal(0.0001), "0.0001");
    }

    #[test]
    fn test_large_values_scientific() {
        assert_eq!(format_decimal(1e16), "1e+16");
        assert_eq!(format_decimal(1.5e16), "1.5e+16");
        assert_eq!(format_decimal(-3e120), "-3e+120");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_decimal(f64::NAN), "nan");
        assert_eq!(format_decimal(f64::INFINITY), "inf");
        assert_eq!(format_decimal(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_round_to_four_places() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(0.82, 4), 0.82);
        assert_eq!(round_to(1.0, 4), 1.0);
        assert_eq!(format_decimal(round_to(0.71234999, 4)), "0.7123");
    }

    #[test]
    fn test_round_to_non_finite_passthrough() {
        assert!(round_to(f64::NAN, 4).is_nan());
        assert_eq!(round_to(f64::INFINITY, 4), f64::INFINITY);
    }

    #[test]
    fn test_join_decimals() {
        assert_eq!(join_decimals(&[0.82, 0.71, 0.65], ","), "0.82,0.71,0.65");
        assert_eq!(join_decimals(&[1.0, 0.5], ", "), "1.0, 0.5");
        assert_eq!(join_decimals(&[], ","), "");
    }
}
