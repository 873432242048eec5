use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operation side (buy or sell)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Buy,
    Sell,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Buy => "BUY",
            OperationType::Sell => "SELL",
        }
    }
}

impl FromStr for OperationType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "COMPRA" | "C" => Ok(OperationType::Buy),
            "SELL" | "VENTA" | "V" => Ok(OperationType::Sell),
            _ => Err(()),
        }
    }
}

/// Largest operation amount, portfolio value or fee minimum the calculators
/// work with (one quadrillion pesos)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0); // 1_000_000_000_000_000

/// Per-side operation fees charged by a broker
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OperationFees {
    /// Commission as a fraction of the operation amount (0.005 = 0.5%)
    pub percentage: Decimal,
    /// Minimum commission, in the same currency as the operation amount
    pub minimum: Decimal,
    /// IVA rate applied on top of the commission (0.21 = 21%)
    pub iva: Decimal,
}

/// Monthly custody fees charged on the portfolio value above an exempt threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CustodyFees {
    pub exempt_amount: Decimal,
    pub monthly_percentage: Decimal,
    pub monthly_minimum: Decimal,
    pub iva: Decimal,
}

/// Commission configuration of a single broker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CommissionConfig {
    pub broker: String,
    pub buy: OperationFees,
    pub sell: OperationFees,
    pub custody: CustodyFees,
}

impl CommissionConfig {
    pub fn fees_for(&self, operation_type: OperationType) -> &OperationFees {
        match operation_type {
            OperationType::Buy => &self.buy,
            OperationType::Sell => &self.sell,
        }
    }
}

/// Result of a single buy/sell commission calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommissionCalculation {
    pub operation_type: OperationType,
    pub amount: Decimal,
    pub base_commission: Decimal,
    pub iva_amount: Decimal,
    pub total_commission: Decimal,
    pub net_amount: Decimal,
    pub minimum_applied: bool,
    /// Total commission as a percentage of the amount
    pub effective_rate: Decimal,
}

/// Result of a monthly custody calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustodyCalculation {
    pub portfolio_value: Decimal,
    pub exempt_amount: Decimal,
    pub is_exempt: bool,
    pub applicable_amount: Decimal,
    pub monthly_fee: Decimal,
    pub iva_amount: Decimal,
    pub total_monthly_cost: Decimal,
    pub annual_fee: Decimal,
    /// Annual fee as a percentage of the portfolio value
    pub effective_annual_rate: Decimal,
}
