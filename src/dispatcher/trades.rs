use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use tracing::info;

use super::calculators::parse_operation;
use super::{open_database, print_json};
use crate::cli::{formatters, TradeCommands};
use crate::config::AppConfig;
use crate::db;
use crate::trades::{record_trade, NewTrade};
use crate::utils::{format_currency, parse_decimal};

pub async fn dispatch_trades(action: TradeCommands, json_output: bool) -> Result<()> {
    match action {
        TradeCommands::Add {
            ticker,
            operation,
            quantity,
            price,
            date,
            broker,
            notes,
        } => {
            dispatch_trade_add(
                &ticker,
                &operation,
                &quantity,
                &price,
                &date,
                broker.as_deref(),
                notes,
                json_output,
            )
            .await
        }
        TradeCommands::List { ticker } => dispatch_trades_list(ticker.as_deref(), json_output).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn dispatch_trade_add(
    ticker: &str,
    operation: &str,
    quantity_str: &str,
    price_str: &str,
    date_str: &str,
    broker: Option<&str>,
    notes: Option<String>,
    json_output: bool,
) -> Result<()> {
    info!("Adding trade for {}", ticker);

    let operation_type = parse_operation(operation)?;
    let quantity = parse_decimal(quantity_str, "quantity")?;
    let price = parse_decimal(price_str, "price")?;
    let trade_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Invalid date format. Use YYYY-MM-DD")?;

    let broker = AppConfig::load()?.resolve_broker(broker);
    let conn = open_database()?;

    let trade = record_trade(
        &conn,
        &NewTrade {
            ticker: ticker.to_string(),
            operation_type,
            quantity,
            price,
            trade_date,
            broker,
            notes,
        },
    )?;

    if json_output {
        return print_json(&trade);
    }

    println!(
        "{} Trade #{} recorded: {} {} x{} @ {}",
        "✓".green().bold(),
        trade.id.unwrap_or_default(),
        trade.operation_type.as_str(),
        trade.ticker.cyan().bold(),
        trade.quantity,
        format_currency(trade.price)
    );
    println!(
        "  Amount: {}  Commission: {}  Net: {}",
        format_currency(trade.amount),
        format_currency(trade.total_commission).yellow(),
        format_currency(trade.net_amount)
    );
    if trade.minimum_applied {
        println!("  {}", "Minimum commission applied".yellow());
    }

    Ok(())
}

async fn dispatch_trades_list(ticker: Option<&str>, json_output: bool) -> Result<()> {
    let conn = open_database()?;
    let trades = db::list_trades(&conn, ticker)?;

    if json_output {
        print_json(&trades)
    } else {
        println!("{}", formatters::format_trades_table(&trades));
        Ok(())
    }
}
