// Database module - SQLite connection, broker configs and trade journal

pub mod models;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

use crate::commissions::presets::builtin_presets;
use crate::commissions::{
    CommissionConfig, CustodyFees, OperationFees, OperationType, MAX_AMOUNT,
};
use crate::error::CedearsError;
pub use models::Trade;

/// Get the application directory (~/.cedears), creating it if needed
pub fn get_app_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let app_dir = PathBuf::from(home).join(".cedears");

    std::fs::create_dir_all(&app_dir).context("Failed to create .cedears directory")?;

    Ok(app_dir)
}

/// Get the default database path (~/.cedears/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    Ok(get_app_dir()?.join("data.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(p) => p,
        None => get_default_db_path()?,
    };
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Initialize the database with schema and seed the built-in broker presets
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let conn = open_db(db_path)?;
    init_schema(&conn)
}

/// Run the schema SQL and seed presets on an open connection
pub fn init_schema(conn: &Connection) -> Result<()> {
    info!("Initializing database schema");

    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")?;

    seed_presets(conn)?;

    Ok(())
}

/// Insert built-in presets that are not present yet. Never overwrites edits.
fn seed_presets(conn: &Connection) -> Result<()> {
    for preset in builtin_presets() {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO commission_configs (
                broker, buy_percentage, buy_minimum, buy_iva,
                sell_percentage, sell_minimum, sell_iva,
                custody_exempt_amount, custody_monthly_percentage,
                custody_monthly_minimum, custody_iva
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            config_params(&preset),
        )?;
        if inserted > 0 {
            debug!("Seeded broker preset {}", preset.broker);
        }
    }
    Ok(())
}

fn config_params(config: &CommissionConfig) -> [String; 11] {
    [
        config.broker.clone(),
        config.buy.percentage.to_string(),
        config.buy.minimum.to_string(),
        config.buy.iva.to_string(),
        config.sell.percentage.to_string(),
        config.sell.minimum.to_string(),
        config.sell.iva.to_string(),
        config.custody.exempt_amount.to_string(),
        config.custody.monthly_percentage.to_string(),
        config.custody.monthly_minimum.to_string(),
        config.custody.iva.to_string(),
    ]
}

/// Normalize a broker name for storage and lookup
pub fn normalize_broker(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate a commission config: rates are fractions in [0, 1), amounts in [0, MAX_AMOUNT]
pub fn validate_commission_config(config: &CommissionConfig) -> Result<()> {
    if config.broker.trim().is_empty() {
        return Err(CedearsError::ValidationError("broker name cannot be empty".to_string()).into());
    }

    let rates = [
        ("buy percentage", config.buy.percentage),
        ("buy iva", config.buy.iva),
        ("sell percentage", config.sell.percentage),
        ("sell iva", config.sell.iva),
        ("custody monthly percentage", config.custody.monthly_percentage),
        ("custody iva", config.custody.iva),
    ];
    for (label, rate) in rates {
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(CedearsError::ValidationError(format!(
                "{} must be a fraction between 0 and 1 (got {})",
                label, rate
            ))
            .into());
        }
    }

    let amounts = [
        ("buy minimum", config.buy.minimum),
        ("sell minimum", config.sell.minimum),
        ("custody exempt amount", config.custody.exempt_amount),
        ("custody monthly minimum", config.custody.monthly_minimum),
    ];
    for (label, amount) in amounts {
        if amount < Decimal::ZERO {
            return Err(CedearsError::ValidationError(format!(
                "{} cannot be negative (got {})",
                label, amount
            ))
            .into());
        }
        if amount > MAX_AMOUNT {
            return Err(CedearsError::ValidationError(format!(
                "{} cannot exceed {} (got {})",
                label, MAX_AMOUNT, amount
            ))
            .into());
        }
    }

    Ok(())
}

/// Insert or replace a broker commission config
pub fn upsert_commission_config(conn: &Connection, config: &CommissionConfig) -> Result<()> {
    validate_commission_config(config)?;

    let mut config = config.clone();
    config.broker = normalize_broker(&config.broker);

    conn.execute(
        "INSERT INTO commission_configs (
            broker, buy_percentage, buy_minimum, buy_iva,
            sell_percentage, sell_minimum, sell_iva,
            custody_exempt_amount, custody_monthly_percentage,
            custody_monthly_minimum, custody_iva
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(broker) DO UPDATE SET
            buy_percentage = excluded.buy_percentage,
            buy_minimum = excluded.buy_minimum,
            buy_iva = excluded.buy_iva,
            sell_percentage = excluded.sell_percentage,
            sell_minimum = excluded.sell_minimum,
            sell_iva = excluded.sell_iva,
            custody_exempt_amount = excluded.custody_exempt_amount,
            custody_monthly_percentage = excluded.custody_monthly_percentage,
            custody_monthly_minimum = excluded.custody_monthly_minimum,
            custody_iva = excluded.custody_iva,
            updated_at = datetime('now')",
        config_params(&config),
    )
    .context(format!("Failed to save commission config for {}", config.broker))?;

    info!("Saved commission config for {}", config.broker);
    Ok(())
}

const CONFIG_COLUMNS: &str = "broker, buy_percentage, buy_minimum, buy_iva,
    sell_percentage, sell_minimum, sell_iva,
    custody_exempt_amount, custody_monthly_percentage, custody_monthly_minimum, custody_iva";

fn config_from_row(row: &Row) -> Result<CommissionConfig, rusqlite::Error> {
    Ok(CommissionConfig {
        broker: row.get(0)?,
        buy: OperationFees {
            percentage: get_decimal_value(row, 1)?,
            minimum: get_decimal_value(row, 2)?,
            iva: get_decimal_value(row, 3)?,
        },
        sell: OperationFees {
            percentage: get_decimal_value(row, 4)?,
            minimum: get_decimal_value(row, 5)?,
            iva: get_decimal_value(row, 6)?,
        },
        custody: CustodyFees {
            exempt_amount: get_decimal_value(row, 7)?,
            monthly_percentage: get_decimal_value(row, 8)?,
            monthly_minimum: get_decimal_value(row, 9)?,
            iva: get_decimal_value(row, 10)?,
        },
    })
}

/// Get a broker commission config by name
pub fn get_commission_config(conn: &Connection, broker: &str) -> Result<Option<CommissionConfig>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM commission_configs WHERE broker = ?1",
        CONFIG_COLUMNS
    ))?;

    let config = stmt
        .query_row([normalize_broker(broker)], config_from_row)
        .optional()?;

    Ok(config)
}

/// Get a broker commission config, failing with `BrokerNotFound` if absent
pub fn require_commission_config(conn: &Connection, broker: &str) -> Result<CommissionConfig> {
    get_commission_config(conn, broker)?
        .ok_or_else(|| CedearsError::BrokerNotFound(normalize_broker(broker)).into())
}

/// List all broker commission configs ordered by name
pub fn list_commission_configs(conn: &Connection) -> Result<Vec<CommissionConfig>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM commission_configs ORDER BY broker",
        CONFIG_COLUMNS
    ))?;

    let configs = stmt
        .query_map([], config_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(configs)
}

/// Delete a broker config. Brokers referenced by recorded trades cannot be deleted.
pub fn delete_commission_config(conn: &Connection, broker: &str) -> Result<()> {
    let broker = normalize_broker(broker);

    let trade_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trades WHERE broker = ?1",
        [&broker],
        |row| row.get(0),
    )?;
    if trade_count > 0 {
        return Err(CedearsError::ValidationError(format!(
            "broker {} has {} recorded trade(s) and cannot be deleted",
            broker, trade_count
        ))
        .into());
    }

    let deleted = conn.execute("DELETE FROM commission_configs WHERE broker = ?1", [&broker])?;
    if deleted == 0 {
        return Err(CedearsError::BrokerNotFound(broker).into());
    }

    info!("Deleted commission config for {}", broker);
    Ok(())
}

/// Insert trade, returns trade id
pub fn insert_trade(conn: &Connection, trade: &Trade) -> Result<i64> {
    conn.execute(
        "INSERT INTO trades (
            ticker, operation_type, trade_date, quantity, price, broker,
            amount, base_commission, iva_amount, total_commission, net_amount,
            minimum_applied, notes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            trade.ticker,
            trade.operation_type.as_str(),
            trade.trade_date,
            trade.quantity.to_string(),
            trade.price.to_string(),
            normalize_broker(&trade.broker),
            trade.amount.to_string(),
            trade.base_commission.to_string(),
            trade.iva_amount.to_string(),
            trade.total_commission.to_string(),
            trade.net_amount.to_string(),
            trade.minimum_applied,
            trade.notes,
        ],
    )
    .context(format!("Failed to insert trade for {}", trade.ticker))?;

    Ok(conn.last_insert_rowid())
}

const TRADE_COLUMNS: &str = "id, ticker, operation_type, trade_date, quantity, price, broker,
    amount, base_commission, iva_amount, total_commission, net_amount, minimum_applied, notes";

fn trade_from_row(row: &Row) -> Result<Trade, rusqlite::Error> {
    let op: String = row.get(2)?;
    let operation_type = OperationType::from_str(&op).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(CedearsError::DbError(format!("unknown operation type '{}'", op))),
        )
    })?;

    Ok(Trade {
        id: Some(row.get(0)?),
        ticker: row.get(1)?,
        operation_type,
        trade_date: row.get(3)?,
        quantity: get_decimal_value(row, 4)?,
        price: get_decimal_value(row, 5)?,
        broker: row.get(6)?,
        amount: get_decimal_value(row, 7)?,
        base_commission: get_decimal_value(row, 8)?,
        iva_amount: get_decimal_value(row, 9)?,
        total_commission: get_decimal_value(row, 10)?,
        net_amount: get_decimal_value(row, 11)?,
        minimum_applied: row.get(12)?,
        notes: row.get(13)?,
    })
}

/// List trades, optionally filtered by ticker, in chronological order
pub fn list_trades(conn: &Connection, ticker: Option<&str>) -> Result<Vec<Trade>> {
    let trades = match ticker {
        Some(t) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM trades WHERE ticker = ?1 ORDER BY trade_date ASC, id ASC",
                TRADE_COLUMNS
            ))?;
            let rows = stmt.query_map([t.to_uppercase()], trade_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM trades ORDER BY trade_date ASC, id ASC",
                TRADE_COLUMNS
            ))?;
            let rows = stmt.query_map([], trade_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(trades)
}

/// Get all trades dated within a calendar year
pub fn get_trades_for_year(conn: &Connection, year: i32) -> Result<Vec<Trade>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM trades
         WHERE trade_date >= ?1 AND trade_date <= ?2
         ORDER BY trade_date ASC, id ASC",
        TRADE_COLUMNS
    ))?;

    let from = format!("{:04}-01-01", year);
    let to = format!("{:04}-12-31", year);
    let trades = stmt
        .query_map(params![from, to], trade_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(trades)
}

/// Helper to read Decimal from SQLite (handles both INTEGER, REAL and TEXT)
pub fn get_decimal_value(row: &Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Decimal::from_str(s).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => {
            Decimal::try_from(f).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        }
        _ => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            rusqlite::types::Type::Null,
        )),
    }
}
