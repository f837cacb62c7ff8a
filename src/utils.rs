//! Amount helpers: human-readable decimal literals to chain base units and back.
//!
//! All conversions use `u128` checked arithmetic, which is the balance type of
//! the supported chains. Nothing here goes through floating point.

use thiserror::Error;

/// Why a user-supplied amount could not be turned into base units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount cannot be empty")]
    Empty,
    #[error("'{0}' is not a decimal number")]
    NotDecimal(String),
    #[error("'{value}' has more than {max} decimal places")]
    TooManyDecimals { value: String, max: u32 },
    #[error("'{0}' exceeds the chain balance range")]
    Overflow(String),
}

/// Check that `input` is a plain non-negative decimal literal (`10`, `0.5`, `.5`, `1.`).
///
/// Signs, exponents, hex and separators are rejected.
pub fn is_decimal_literal(input: &str) -> bool {
    let trimmed = input.trim();
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match trimmed.split_once('.') {
        Some((whole, frac)) => {
            all_digits(whole) && all_digits(frac) && !(whole.is_empty() && frac.is_empty())
        }
        None => !trimmed.is_empty() && all_digits(trimmed),
    }
}

/// `10^decimals` as an exact integer.
pub fn decimal_factor(decimals: u32) -> Option<u128> {
    10u128.checked_pow(decimals)
}

/// Parse a decimal literal into base units: `amount * 10^decimals`.
///
/// # Errors
/// Returns an error if the literal is empty or malformed, carries more
/// fractional digits than `decimals` (it is never truncated), or does not fit
/// in a `u128`.
pub fn parse_units(input: &str, decimals: u32) -> Result<u128, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if !is_decimal_literal(trimmed) {
        return Err(AmountError::NotDecimal(trimmed.to_string()));
    }

    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    // Trailing zeros never change the value
    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            value: trimmed.to_string(),
            max: decimals,
        });
    }

    let overflow = || AmountError::Overflow(trimmed.to_string());
    let factor = decimal_factor(decimals).ok_or_else(overflow)?;

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| overflow())?
    };

    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let digits: u128 = frac.parse().map_err(|_| overflow())?;
        let scale = decimal_factor(decimals - frac.len() as u32).ok_or_else(overflow)?;
        digits.checked_mul(scale).ok_or_else(overflow)?
    };

    whole_units
        .checked_mul(factor)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(overflow)
}

/// Render base units back as a decimal string without trailing zeros.
pub fn format_units(units: u128, decimals: u32) -> String {
    let Some(factor) = decimal_factor(decimals) else {
        return units.to_string();
    };
    let whole = units / factor;
    let frac = units % factor;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== is_decimal_literal tests ====================

    #[test]
    fn test_is_decimal_literal_accepts_plain_forms() {
        assert!(is_decimal_literal("10"));
        assert!(is_decimal_literal("0.5"));
        assert!(is_decimal_literal(".5"));
        assert!(is_decimal_literal("1."));
        assert!(is_decimal_literal("  42  "));
    }

    #[test]
    fn test_is_decimal_literal_rejects_other_forms() {
        assert!(!is_decimal_literal(""));
        assert!(!is_decimal_literal("."));
        assert!(!is_decimal_literal("-1"));
        assert!(!is_decimal_literal("1e3"));
        assert!(!is_decimal_literal("0x10"));
        assert!(!is_decimal_literal("1.2.3"));
        assert!(!is_decimal_literal("notanumber"));
        assert!(!is_decimal_literal("1,000"));
    }

    // ==================== parse_units tests ====================

    #[test]
    fn test_parse_units_one_with_twelve_decimals() {
        assert_eq!(parse_units("1", 12).unwrap(), 1_000_000_000_000u128);
    }

    #[test]
    fn test_parse_units_fractional() {
        assert_eq!(parse_units("0.5", 12).unwrap(), 500_000_000_000u128);
        assert_eq!(parse_units(".25", 2).unwrap(), 25);
        assert_eq!(parse_units("1.", 3).unwrap(), 1_000);
    }

    #[test]
    fn test_parse_units_high_precision_is_exact() {
        // A float would round this
        let result = parse_units("0.123456789012345678", 18).unwrap();
        assert_eq!(result, 123_456_789_012_345_678u128);
    }

    #[test]
    fn test_parse_units_large_whole_is_exact() {
        let result = parse_units("123456789012345678901", 12).unwrap();
        assert_eq!(result, 123_456_789_012_345_678_901_000_000_000_000u128);
    }

    #[test]
    fn test_parse_units_trailing_zeros_allowed_past_precision() {
        assert_eq!(parse_units("1.500000", 2).unwrap(), 150);
    }

    #[test]
    fn test_parse_units_too_many_decimals_fails() {
        let err = parse_units("1.001", 2).unwrap_err();
        assert_eq!(
            err,
            AmountError::TooManyDecimals {
                value: "1.001".to_string(),
                max: 2
            }
        );
    }

    #[test]
    fn test_parse_units_zero_decimals() {
        assert_eq!(parse_units("7", 0).unwrap(), 7);
        assert!(parse_units("7.1", 0).is_err());
    }

    #[test]
    fn test_parse_units_empty_fails() {
        assert_eq!(parse_units("   ", 12).unwrap_err(), AmountError::Empty);
    }

    #[test]
    fn test_parse_units_not_decimal_fails() {
        let err = parse_units("abc", 12).unwrap_err();
        assert!(err.to_string().contains("not a decimal number"));
    }

    #[test]
    fn test_parse_units_overflow_fails() {
        let err = parse_units("340282366920938463463374607431768211456", 0).unwrap_err();
        assert!(matches!(err, AmountError::Overflow(_)));

        let err = parse_units("1000000000000000000000000000", 12).unwrap_err();
        assert!(matches!(err, AmountError::Overflow(_)));
    }

    // ==================== format_units tests ====================

    #[test]
    fn test_format_units_whole() {
        assert_eq!(format_units(3_000_000_000_000, 12), "3");
    }

    #[test]
    fn test_format_units_fractional() {
        assert_eq!(format_units(1_500_000_000_000, 12), "1.5");
        assert_eq!(format_units(5, 12), "0.000000000005");
    }

    #[test]
    fn test_format_units_zero() {
        assert_eq!(format_units(0, 12), "0");
    }
}
