//! Utility functions for formatting and common operations
//!
//! Centralized formatting of currency, rates and percentages so every
//! command displays numbers the same way.

use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::commissions::MAX_AMOUNT;
use crate::error::CedearsError;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "$ " prefix (Argentine peso)
    Ars,
    /// No currency symbol (for table cells, calculations display)
    None,
}

/// Core formatting function with full control over output.
///
/// Formats a Decimal value using Argentine locale conventions:
/// - Thousands separator: `.` (period)
/// - Decimal separator: `,` (comma)
///
/// # Examples
/// ```
/// use cedears::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::Ars),
///     "$ 1.234,56"
/// );
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 15, CurrencySymbol::None),
///     "       1.234,00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let rounded = value.abs().round_dp(2);

    let formatted = format!("{:.2}", rounded);
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative && !rounded.is_zero() { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Ars => "$ ",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{}{},{}", prefix, sign, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as Argentine pesos with symbol: "$ 1.234,56"
///
/// # Examples
/// ```
/// use cedears::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "$ 1.234,56");
/// assert_eq!(format_currency(dec!(-500)), "$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::Ars)
}

/// Format number only (no symbol): "1.234,56"
pub fn format_decimal_ar(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

/// Format a percentage value (already multiplied by 100): "1,21%"
///
/// # Examples
/// ```
/// use cedears::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(1.21)), "1,21%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_decimal_ar(value))
}

/// Format a fractional rate as a percentage with up to 4 decimals: 0.0025 -> "0,25%"
pub fn format_rate(rate: Decimal) -> String {
    let pct = (rate * Decimal::ONE_HUNDRED).round_dp(4).normalize();
    format!("{}%", pct.to_string().replace('.', ","))
}

/// Parse a user-supplied decimal such as `1234.56` or `-0.01`
pub fn parse_decimal(input: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(input.trim()).map_err(|_| {
        CedearsError::ParseError(format!("invalid {} '{}': expected a decimal number", field, input))
            .into()
    })
}

/// Parse a user-supplied amount; negative values and values above
/// [`MAX_AMOUNT`] are rejected.
pub fn parse_amount(input: &str, field: &str) -> Result<Decimal> {
    let value = parse_decimal(input, field)?;

    if value < Decimal::ZERO {
        return Err(CedearsError::ValidationError(format!("{} cannot be negative", field)).into());
    }
    if value > MAX_AMOUNT {
        return Err(CedearsError::ValidationError(format!(
            "{} cannot exceed {} (got {})",
            field, MAX_AMOUNT, value
        ))
        .into());
    }

    Ok(value)
}

/// Spanish month name (1-based)
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Enero",
        2 => "Febrero",
        3 => "Marzo",
        4 => "Abril",
        5 => "Mayo",
        6 => "Junio",
        7 => "Julio",
        8 => "Agosto",
        9 => "Septiembre",
        10 => "Octubre",
        11 => "Noviembre",
        12 => "Diciembre",
        _ => "Desconocido",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "$ 1.234,56");
        assert_eq!(format_currency(dec!(0.99)), "$ 0,99");
        assert_eq!(format_currency(dec!(1000000)), "$ 1.000.000,00");
    }

    #[test]
    fn test_format_currency_large_values() {
        assert_eq!(format_currency(dec!(12345)), "$ 12.345,00");
        assert_eq!(format_currency(dec!(123456)), "$ 123.456,00");
        assert_eq!(format_currency(dec!(12345678.90)), "$ 12.345.678,90");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.56)), "$ -1.234,56");
        assert_eq!(format_currency(dec!(-0.001)), "$ 0,00");
    }

    #[test]
    fn test_format_currency_rounds_half_even() {
        assert_eq!(format_currency(dec!(181.5)), "$ 181,50");
        assert_eq!(format_currency(dec!(1.005)), "$ 1,00");
        assert_eq!(format_currency(dec!(1.006)), "$ 1,01");
    }

    #[test]
    fn test_format_with_width() {
        let result = format_currency_with_width(dec!(100), 15, CurrencySymbol::Ars);
        assert_eq!(result, "       $ 100,00");
        assert_eq!(format_decimal_ar(dec!(-500)), "-500,00");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_rate(dec!(0.005)), "0,5%");
        assert_eq!(format_rate(dec!(0.0025)), "0,25%");
        assert_eq!(format_rate(dec!(0.21)), "21%");
        assert_eq!(format_percent(dec!(3.025)), "3,02%");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10000", "amount").unwrap(), dec!(10000));
        assert_eq!(parse_amount(" 0.5 ", "amount").unwrap(), dec!(0.5));

        let err = parse_amount("-1", "amount").unwrap_err();
        assert_eq!(err.to_string(), "validation error: amount cannot be negative");

        let err = parse_amount("abc", "price").unwrap_err();
        assert!(err.to_string().starts_with("parse error"));

        assert_eq!(parse_decimal("-0.01", "growth").unwrap(), dec!(-0.01));
    }

    #[test]
    fn test_parse_amount_upper_bound() {
        assert_eq!(parse_amount("1000000000000000", "amount").unwrap(), MAX_AMOUNT);

        let err = parse_amount("1000000000000000.01", "amount").unwrap_err();
        assert!(err.to_string().contains("amount cannot exceed"));

        let err = parse_amount("79228162514264337593543950335", "amount").unwrap_err();
        assert!(err.to_string().starts_with("validation error"));
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Enero");
        assert_eq!(month_name(12), "Diciembre");
        assert_eq!(month_name(13), "Desconocido");
    }
}
