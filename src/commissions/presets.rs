//! Built-in broker commission presets
//!
//! Presets are seeded into the database on first use; user edits made with
//! `brokers set` are never overwritten.

use rust_decimal::Decimal;

use super::models::{CommissionConfig, CustodyFees, OperationFees};

pub const DEFAULT_BROKER: &str = "galicia";

/// Banco Galicia: 0.5% per operation (min $150), custody 0.25% monthly above
/// $1.000.000 (min $500), IVA 21% on everything.
pub fn galicia() -> CommissionConfig {
    let operation = OperationFees {
        percentage: Decimal::new(5, 3),
        minimum: Decimal::from(150),
        iva: Decimal::new(21, 2),
    };

    CommissionConfig {
        broker: DEFAULT_BROKER.to_string(),
        buy: operation,
        sell: operation,
        custody: CustodyFees {
            exempt_amount: Decimal::from(1_000_000),
            monthly_percentage: Decimal::new(25, 4),
            monthly_minimum: Decimal::from(500),
            iva: Decimal::new(21, 2),
        },
    }
}

/// All built-in presets
pub fn builtin_presets() -> Vec<CommissionConfig> {
    vec![galicia()]
}

/// Find a built-in preset by broker name (case-insensitive)
pub fn find_preset(broker: &str) -> Option<CommissionConfig> {
    builtin_presets()
        .into_iter()
        .find(|c| c.broker.eq_ignore_ascii_case(broker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_galicia_rates() {
        let config = galicia();
        assert_eq!(config.buy.percentage, dec!(0.005));
        assert_eq!(config.sell.minimum, dec!(150));
        assert_eq!(config.custody.monthly_percentage, dec!(0.0025));
        assert_eq!(config.custody.iva, dec!(0.21));
    }

    #[test]
    fn test_find_preset_ignores_case() {
        assert!(find_preset("GALICIA").is_some());
        assert!(find_preset("unknown").is_none());
    }
}
