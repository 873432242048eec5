use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::commissions::{CommissionCalculation, OperationType};

/// Recorded buy/sell operation with the commission charged at record time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Option<i64>,
    pub ticker: String,
    pub operation_type: OperationType,
    pub trade_date: NaiveDate,
    pub quantity: Decimal,
    pub price: Decimal,
    pub broker: String,
    pub amount: Decimal,
    pub base_commission: Decimal,
    pub iva_amount: Decimal,
    pub total_commission: Decimal,
    pub net_amount: Decimal,
    pub minimum_applied: bool,
    pub notes: Option<String>,
}

impl Trade {
    /// Build a trade row from a commission calculation
    pub fn from_calculation(
        ticker: &str,
        trade_date: NaiveDate,
        quantity: Decimal,
        price: Decimal,
        broker: &str,
        calc: &CommissionCalculation,
        notes: Option<String>,
    ) -> Self {
        Trade {
            id: None,
            ticker: ticker.to_uppercase(),
            operation_type: calc.operation_type,
            trade_date,
            quantity,
            price,
            broker: broker.to_string(),
            amount: calc.amount,
            base_commission: calc.base_commission,
            iva_amount: calc.iva_amount,
            total_commission: calc.total_commission,
            net_amount: calc.net_amount,
            minimum_applied: calc.minimum_applied,
            notes,
        }
    }
}
