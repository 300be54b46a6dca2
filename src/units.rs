//! Conversions between raw token amounts and display units

use alloy::primitives::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    Malformed(String),

    #[error("'{0}' has more than {1} decimal places")]
    TooPrecise(String, u8),

    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Format a U256 value with decimals
pub fn format_units(value: U256, decimals: u8) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let remainder_str = format!("{:0>width$}", remainder, width = decimals as usize);
    let trimmed = remainder_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

/// Raw amount as a float in display units
pub fn to_display(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals).parse().unwrap_or(0.0)
}

/// Parse a user-entered decimal amount into raw units, rejecting zero
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match input.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (input, ""),
    };
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
        return Err(AmountError::Malformed(input.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(AmountError::TooPrecise(input.to_string(), decimals));
    }

    let digits = format!("{}{:0<width$}", whole, frac, width = decimals as usize);
    let raw = U256::from_str_radix(&digits, 10)
        .map_err(|_| AmountError::Malformed(input.to_string()))?;

    if raw.is_zero() {
        return Err(AmountError::NotPositive);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        // 1000 USDT (6 decimals)
        assert_eq!(format_units(U256::from(1_000_000_000u64), 6), "1000");
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_units(U256::ZERO, 6), "0");
    }

    #[test]
    fn test_to_display() {
        assert_eq!(to_display(U256::from(125_430_000_000u64), 6), 125_430.0);
        assert_eq!(to_display(U256::from(99_500_000u64), 6), 99.5);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100", 6), Ok(U256::from(100_000_000u64)));
        assert_eq!(parse_amount("0.5", 6), Ok(U256::from(500_000u64)));
        assert_eq!(parse_amount(".25", 6), Ok(U256::from(250_000u64)));
        assert_eq!(parse_amount(" 12.000001 ", 6), Ok(U256::from(12_000_001u64)));
    }

    #[test]
    fn test_parse_amount_rejects_invalid() {
        assert_eq!(parse_amount("", 6), Err(AmountError::Empty));
        assert_eq!(parse_amount("0", 6), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("0.000", 6), Err(AmountError::NotPositive));
        assert!(matches!(parse_amount("-5", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_amount("1e3", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(parse_amount(".", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(
            parse_amount("1.0000001", 6),
            Err(AmountError::TooPrecise(_, 6))
        ));
    }
}
