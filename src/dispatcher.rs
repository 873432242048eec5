//! Command dispatcher that routes parsed clap commands to their handlers.
//!
//! Handlers open the database, resolve the broker configuration and either
//! print a formatted table or, with `--json`, a JSON document.

mod brokers;
mod calculators;
mod reports;
mod trades;

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::cli::Commands;
use crate::commissions::CommissionConfig;
use crate::config::AppConfig;
use crate::db;

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Commands, json_output: bool) -> Result<()> {
    debug!("Dispatching {:?}", command);

    match command {
        Commands::Commission {
            operation,
            amount,
            broker,
        } => calculators::dispatch_commission(&operation, &amount, broker.as_deref(), json_output).await,
        Commands::Custody {
            portfolio_value,
            broker,
        } => calculators::dispatch_custody(&portfolio_value, broker.as_deref(), json_output).await,
        Commands::BreakEven {
            amount,
            months,
            growth,
            holdings,
            no_exit,
            broker,
        } => {
            calculators::dispatch_break_even(
                calculators::ProjectionArgs {
                    months,
                    growth,
                    holdings,
                    include_exit: !no_exit,
                    broker,
                },
                &amount,
                json_output,
            )
            .await
        }
        Commands::Optimize {
            target_pct,
            months,
            growth,
            holdings,
            step,
            max,
            no_exit,
            broker,
        } => {
            calculators::dispatch_optimize(
                calculators::ProjectionArgs {
                    months,
                    growth,
                    holdings,
                    include_exit: !no_exit,
                    broker,
                },
                &target_pct,
                &step,
                &max,
                json_output,
            )
            .await
        }
        Commands::Brokers { action } => brokers::dispatch_brokers(action, json_output).await,
        Commands::Trades { action } => trades::dispatch_trades(action, json_output).await,
        Commands::Report { action } => reports::dispatch_report(action, json_output).await,
    }
}

/// Initialize (if needed) and open the default database
fn open_database() -> Result<Connection> {
    db::init_database(None)?;
    db::open_db(None)
}

/// Load the config file and fetch the commission config of the selected broker
fn resolve_commission_config(
    conn: &Connection,
    broker_flag: Option<&str>,
) -> Result<(AppConfig, CommissionConfig)> {
    let app_config = AppConfig::load()?;
    let broker = app_config.resolve_broker(broker_flag);
    let commission_config = db::require_commission_config(conn, &broker)?;
    Ok((app_config, commission_config))
}

/// JSON payload tagged with the broker it was calculated for
#[derive(Serialize)]
struct BrokerScoped<'a, T: Serialize> {
    broker: &'a str,
    #[serde(flatten)]
    result: &'a T,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
