use anyhow::{Context, Result};
use chrono::Datelike;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::commissions::operation::percentage_of;
use crate::commissions::OperationType;
use crate::db::{self, Trade};
use crate::utils::month_name;

/// Commissions paid in a single month
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthlyCommissionSummary {
    pub month: u32,
    pub month_name: &'static str,
    pub buy_count: u32,
    pub sell_count: u32,
    pub volume: Decimal,
    pub base_commission: Decimal,
    pub iva_amount: Decimal,
    pub total_commission: Decimal,
    pub minimum_applied_count: u32,
}

/// Annual commission report built from the trade journal
#[derive(Debug, Clone, Serialize)]
pub struct CommissionReport {
    pub year: i32,
    pub monthly_summaries: Vec<MonthlyCommissionSummary>,
    pub annual_volume: Decimal,
    pub annual_base_commission: Decimal,
    pub annual_iva: Decimal,
    pub annual_total_commission: Decimal,
    /// Total commission as a percentage of traded volume
    pub effective_rate: Decimal,
    pub by_broker: BTreeMap<String, Decimal>,
}

/// Generate the commission report for a year
pub fn generate_commission_report(conn: &Connection, year: i32) -> Result<CommissionReport> {
    info!("Generating commission report for {}", year);

    let trades = db::get_trades_for_year(conn, year)
        .context(format!("Failed to load trades for {}", year))?;

    Ok(summarize_trades(year, &trades))
}

/// Aggregate trades into monthly and annual totals. Months without trades are omitted.
pub fn summarize_trades(year: i32, trades: &[Trade]) -> CommissionReport {
    let mut months: BTreeMap<u32, MonthlyCommissionSummary> = BTreeMap::new();
    let mut by_broker: BTreeMap<String, Decimal> = BTreeMap::new();

    for trade in trades.iter().filter(|t| t.trade_date.year() == year) {
        let month = trade.trade_date.month();
        let summary = months.entry(month).or_insert_with(|| MonthlyCommissionSummary {
            month,
            month_name: month_name(month),
            ..Default::default()
        });

        match trade.operation_type {
            OperationType::Buy => summary.buy_count += 1,
            OperationType::Sell => summary.sell_count += 1,
        }
        if trade.minimum_applied {
            summary.minimum_applied_count += 1;
        }
        summary.volume += trade.amount;
        summary.base_commission += trade.base_commission;
        summary.iva_amount += trade.iva_amount;
        summary.total_commission += trade.total_commission;

        *by_broker.entry(trade.broker.clone()).or_insert(Decimal::ZERO) += trade.total_commission;
    }

    let monthly_summaries: Vec<MonthlyCommissionSummary> = months.into_values().collect();

    let annual_volume: Decimal = monthly_summaries.iter().map(|m| m.volume).sum();
    let annual_base_commission: Decimal = monthly_summaries.iter().map(|m| m.base_commission).sum();
    let annual_iva: Decimal = monthly_summaries.iter().map(|m| m.iva_amount).sum();
    let annual_total_commission: Decimal =
        monthly_summaries.iter().map(|m| m.total_commission).sum();

    let effective_rate = percentage_of(annual_total_commission, annual_volume);

    CommissionReport {
        year,
        monthly_summaries,
        annual_volume,
        annual_base_commission,
        annual_iva,
        annual_total_commission,
        effective_rate,
        by_broker,
    }
}

/// Export a commission report to CSV
pub fn export_to_csv(report: &CommissionReport) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "Mes",
        "Compras",
        "Ventas",
        "Volumen",
        "Comision",
        "IVA",
        "Total Comisiones",
        "Minimos Aplicados",
    ])?;

    for summary in &report.monthly_summaries {
        writer.write_record([
            summary.month_name.to_string(),
            summary.buy_count.to_string(),
            summary.sell_count.to_string(),
            format!("{:.2}", summary.volume),
            format!("{:.2}", summary.base_commission),
            format!("{:.2}", summary.iva_amount),
            format!("{:.2}", summary.total_commission),
            summary.minimum_applied_count.to_string(),
        ])?;
    }

    let (buys, sells, minimums) = report.monthly_summaries.iter().fold((0, 0, 0), |acc, m| {
        (acc.0 + m.buy_count, acc.1 + m.sell_count, acc.2 + m.minimum_applied_count)
    });
    writer.write_record([
        "TOTAL ANUAL".to_string(),
        buys.to_string(),
        sells.to_string(),
        format!("{:.2}", report.annual_volume),
        format!("{:.2}", report.annual_base_commission),
        format!("{:.2}", report.annual_iva),
        format!("{:.2}", report.annual_total_commission),
        minimums.to_string(),
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
