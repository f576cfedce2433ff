//! Dollar amount formatting.
//!
//! Amounts are shown the way an en-US locale prints numbers: thousands
//! grouped with commas, at most three fraction digits, no trailing zeros.

use rust_decimal::{Decimal, RoundingStrategy};

/// Most fraction digits shown for any amount.
const MAX_FRACTION_DIGITS: u32 = 3;

/// Format a number with en-US grouping (`1250.5` → `"1,250.5"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + whole.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    let digits = whole.len();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Card and cart style: `"$1,250"`.
#[must_use]
pub fn format_dollars(amount: Decimal) -> String {
    format!("${}", format_amount(amount))
}

/// Price breakdown table style, with a space after the sign: `"$ 1,250"`.
#[must_use]
pub fn format_table_dollars(amount: Decimal) -> String {
    format!("$ {}", format_amount(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_groups_thousands() {
        assert_eq!(format_amount(dec("0")), "0");
        assert_eq!(format_amount(dec("999")), "999");
        assert_eq!(format_amount(dec("1250")), "1,250");
        assert_eq!(format_amount(dec("1234567")), "1,234,567");
    }

    #[test]
    fn test_drops_trailing_zeros_and_caps_fraction() {
        assert_eq!(format_amount(dec("1250.00")), "1,250");
        assert_eq!(format_amount(dec("4.50")), "4.5");
        assert_eq!(format_amount(dec("0.12345")), "0.123");
        assert_eq!(format_amount(dec("2.0005")), "2.001");
    }

    #[test]
    fn test_negative_amounts_keep_sign() {
        assert_eq!(format_amount(dec("-15000")), "-15,000");
        assert_eq!(format_amount(dec("-0.0001")), "0");
    }

    #[test]
    fn test_dollar_variants() {
        assert_eq!(format_dollars(dec("12999")), "$12,999");
        assert_eq!(format_table_dollars(dec("6250.5")), "$ 6,250.5");
    }
}
