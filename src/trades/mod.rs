// Trade journal - records operations with the commission charged by the broker

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::info;

use crate::commissions::{calculate_operation_commission, OperationType, MAX_AMOUNT};
use crate::db::{self, Trade};
use crate::error::CedearsError;

/// User input for a new trade
#[derive(Debug, Clone)]
pub struct NewTrade {
    pub ticker: String,
    pub operation_type: OperationType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub trade_date: NaiveDate,
    pub broker: String,
    pub notes: Option<String>,
}

/// Validate, price and store a trade using the broker's current commission config
pub fn record_trade(conn: &Connection, new_trade: &NewTrade) -> Result<Trade> {
    let ticker = new_trade.ticker.trim();
    if ticker.is_empty() {
        return Err(CedearsError::ValidationError("ticker cannot be empty".to_string()).into());
    }
    if new_trade.quantity <= Decimal::ZERO {
        return Err(
            CedearsError::ValidationError("quantity must be greater than zero".to_string()).into(),
        );
    }
    if new_trade.price <= Decimal::ZERO {
        return Err(
            CedearsError::ValidationError("price must be greater than zero".to_string()).into(),
        );
    }

    let config = db::require_commission_config(conn, &new_trade.broker)?;
    let amount = new_trade
        .quantity
        .checked_mul(new_trade.price)
        .filter(|amount| *amount <= MAX_AMOUNT)
        .ok_or_else(|| {
            CedearsError::ValidationError(format!(
                "trade amount (quantity x price) cannot exceed {}",
                MAX_AMOUNT
            ))
        })?;
    let calc = calculate_operation_commission(new_trade.operation_type, amount, &config);

    let mut trade = Trade::from_calculation(
        ticker,
        new_trade.trade_date,
        new_trade.quantity,
        new_trade.price,
        &config.broker,
        &calc,
        new_trade.notes.clone(),
    );
    trade.id = Some(db::insert_trade(conn, &trade)?);

    info!(
        "Recorded {} {} x{} with {} commission",
        trade.operation_type.as_str(),
        trade.ticker,
        trade.quantity,
        trade.total_commission
    );

    Ok(trade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        db::init_schema(&conn).unwrap();
        conn
    }

    fn new_trade(quantity: Decimal, price: Decimal) -> NewTrade {
        NewTrade {
            ticker: "aapl".to_string(),
            operation_type: OperationType::Buy,
            quantity,
            price,
            trade_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            broker: "Galicia".to_string(),
            notes: Some("first lot".to_string()),
        }
    }

    #[test]
    fn test_record_trade_applies_commission() {
        let conn = memory_db();
        let trade = record_trade(&conn, &new_trade(dec!(20), dec!(500))).unwrap();

        assert!(trade.id.is_some());
        assert_eq!(trade.ticker, "AAPL");
        assert_eq!(trade.broker, "galicia");
        assert_eq!(trade.amount, dec!(10000));
        assert_eq!(trade.total_commission, dec!(181.5));
        assert_eq!(trade.net_amount, dec!(10181.5));

        let stored = db::list_trades(&conn, Some("AAPL")).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notes.as_deref(), Some("first lot"));
    }

    #[test]
    fn test_record_trade_rejects_non_positive_values() {
        let conn = memory_db();
        assert!(record_trade(&conn, &new_trade(dec!(0), dec!(500))).is_err());
        assert!(record_trade(&conn, &new_trade(dec!(1), dec!(-5))).is_err());
        assert!(db::list_trades(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_record_trade_rejects_oversized_amount() {
        let conn = memory_db();

        for (quantity, price) in [
            (Decimal::MAX, dec!(2)),
            (dec!(1000000000), dec!(1000000000)),
        ] {
            let err = record_trade(&conn, &new_trade(quantity, price)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<CedearsError>(),
                Some(CedearsError::ValidationError(_))
            ));
        }
        assert!(db::list_trades(&conn, None).unwrap().is_empty());

        let trade = record_trade(&conn, &new_trade(dec!(1000000), dec!(1000000000))).unwrap();
        assert_eq!(trade.amount, MAX_AMOUNT);
    }

    #[test]
    fn test_record_trade_unknown_broker() {
        let conn = memory_db();
        let mut input = new_trade(dec!(1), dec!(100));
        input.broker = "ghost".to_string();

        let err = record_trade(&conn, &input).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CedearsError>(),
            Some(CedearsError::BrokerNotFound(_))
        ));
    }
}
