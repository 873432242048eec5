use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::info;

use super::{open_database, print_json};
use crate::cli::{formatters, BrokerCommands};
use crate::commissions::presets;
use crate::commissions::CommissionConfig;
use crate::config;
use crate::db;
use crate::utils::parse_amount;

/// Fee overrides given to `brokers set`, still unparsed
#[derive(Debug, Default)]
struct FeeOverrides {
    buy_pct: Option<String>,
    buy_min: Option<String>,
    sell_pct: Option<String>,
    sell_min: Option<String>,
    iva: Option<String>,
    custody_exempt: Option<String>,
    custody_pct: Option<String>,
    custody_min: Option<String>,
    custody_iva: Option<String>,
}

pub async fn dispatch_brokers(action: BrokerCommands, json_output: bool) -> Result<()> {
    match action {
        BrokerCommands::List => dispatch_brokers_list(json_output).await,
        BrokerCommands::Show { name } => dispatch_broker_show(&name, json_output).await,
        BrokerCommands::Set {
            name,
            buy_pct,
            buy_min,
            sell_pct,
            sell_min,
            iva,
            custody_exempt,
            custody_pct,
            custody_min,
            custody_iva,
        } => {
            let overrides = FeeOverrides {
                buy_pct,
                buy_min,
                sell_pct,
                sell_min,
                iva,
                custody_exempt,
                custody_pct,
                custody_min,
                custody_iva,
            };
            dispatch_broker_set(&name, &overrides, json_output).await
        }
        BrokerCommands::Delete { name } => dispatch_broker_delete(&name).await,
        BrokerCommands::Import { file } => dispatch_broker_import(&file).await,
    }
}

async fn dispatch_brokers_list(json_output: bool) -> Result<()> {
    let conn = open_database()?;
    let configs = db::list_commission_configs(&conn)?;

    if json_output {
        print_json(&configs)
    } else {
        println!("{}", formatters::format_brokers_table(&configs));
        Ok(())
    }
}

async fn dispatch_broker_show(name: &str, json_output: bool) -> Result<()> {
    let conn = open_database()?;
    let config = db::require_commission_config(&conn, name)?;

    if json_output {
        print_json(&config)
    } else {
        print!("{}", formatters::format_broker_detail(&config));
        Ok(())
    }
}

async fn dispatch_broker_set(name: &str, overrides: &FeeOverrides, json_output: bool) -> Result<()> {
    let conn = open_database()?;
    let broker = db::normalize_broker(name);

    // Start from the stored config, then a preset of the same name, then the default preset
    let base = match db::get_commission_config(&conn, &broker)? {
        Some(existing) => existing,
        None => presets::find_preset(&broker).unwrap_or_else(presets::galicia),
    };
    let config = apply_overrides(base, &broker, overrides)?;

    db::upsert_commission_config(&conn, &config)?;
    info!("Broker {} configured", broker);

    if json_output {
        print_json(&config)
    } else {
        println!("{} Broker {} saved", "✓".green().bold(), broker.cyan());
        print!("{}", formatters::format_broker_detail(&config));
        Ok(())
    }
}

fn apply_overrides(
    mut config: CommissionConfig,
    broker: &str,
    overrides: &FeeOverrides,
) -> Result<CommissionConfig> {
    config.broker = broker.to_string();

    let fields = [
        (&overrides.buy_pct, "buy-pct", &mut config.buy.percentage),
        (&overrides.buy_min, "buy-min", &mut config.buy.minimum),
        (&overrides.sell_pct, "sell-pct", &mut config.sell.percentage),
        (&overrides.sell_min, "sell-min", &mut config.sell.minimum),
        (&overrides.custody_exempt, "custody-exempt", &mut config.custody.exempt_amount),
        (&overrides.custody_pct, "custody-pct", &mut config.custody.monthly_percentage),
        (&overrides.custody_min, "custody-min", &mut config.custody.monthly_minimum),
        (&overrides.custody_iva, "custody-iva", &mut config.custody.iva),
    ];
    for (raw, field, target) in fields {
        if let Some(raw) = raw {
            *target = parse_amount(raw, field)?;
        }
    }

    if let Some(raw) = &overrides.iva {
        let iva = parse_amount(raw, "iva")?;
        config.buy.iva = iva;
        config.sell.iva = iva;
    }

    db::validate_commission_config(&config)?;
    Ok(config)
}

async fn dispatch_broker_delete(name: &str) -> Result<()> {
    let conn = open_database()?;
    db::delete_commission_config(&conn, name)?;

    println!(
        "{} Broker {} deleted",
        "✓".green().bold(),
        db::normalize_broker(name).cyan()
    );
    Ok(())
}

async fn dispatch_broker_import(file: &str) -> Result<()> {
    let configs = config::load_broker_file(Path::new(file))?;
    let mut conn = open_database()?;

    // All brokers of the file are saved, or none
    let tx = conn.transaction()?;
    for broker_config in &configs {
        db::upsert_commission_config(&tx, broker_config)
            .context(format!("Failed to import broker {}", broker_config.broker))?;
    }
    tx.commit()?;

    info!("Imported {} broker(s) from {}", configs.len(), file);
    println!(
        "{} Imported {} broker(s) from {}",
        "✓".green().bold(),
        configs.len(),
        file
    );
    Ok(())
}
