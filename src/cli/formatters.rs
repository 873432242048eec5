//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::commissions::{
    BreakEvenAnalysis, CommissionCalculation, CommissionConfig, CustodyCalculation,
    OptimizationResult,
};
use crate::db::Trade;
use crate::reports::CommissionReport;
use crate::utils::{format_currency, format_percent, format_rate};

#[derive(Tabled)]
struct KeyValueRow {
    #[tabled(rename = "Concept")]
    label: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn kv(label: &str, value: String) -> KeyValueRow {
    KeyValueRow {
        label: label.to_string(),
        value,
    }
}

fn key_value_table(rows: Vec<KeyValueRow>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

/// Format a buy/sell commission calculation
pub fn format_commission(calc: &CommissionCalculation, broker: &str) -> String {
    let mut output = format!(
        "\n{} {} commission - {}\n\n",
        "💸".cyan().bold(),
        calc.operation_type.as_str(),
        broker.bold()
    );

    output.push_str(&key_value_table(vec![
        kv("Amount", format_currency(calc.amount)),
        kv("Base commission", format_currency(calc.base_commission)),
        kv("IVA", format_currency(calc.iva_amount)),
        kv("Total commission", format_currency(calc.total_commission)),
        kv("Net amount", format_currency(calc.net_amount)),
        kv("Effective rate", format_percent(calc.effective_rate)),
        kv("Minimum applied", yes_no(calc.minimum_applied)),
    ]));
    output.push('\n');

    if calc.minimum_applied {
        output.push_str(&format!(
            "\n{} The broker minimum is higher than the percentage commission\n",
            "ℹ".blue().bold()
        ));
    }

    output
}

/// Format a monthly custody calculation
pub fn format_custody(calc: &CustodyCalculation, broker: &str) -> String {
    let mut output = format!("\n{} Custody fees - {}\n\n", "🏦".cyan().bold(), broker.bold());

    if calc.is_exempt {
        output.push_str(&format!(
            "{} Portfolio of {} is within the exempt amount of {}: no custody fee\n",
            "✓".green().bold(),
            format_currency(calc.portfolio_value),
            format_currency(calc.exempt_amount)
        ));
        return output;
    }

    output.push_str(&key_value_table(vec![
        kv("Portfolio value", format_currency(calc.portfolio_value)),
        kv("Exempt amount", format_currency(calc.exempt_amount)),
        kv("Applicable amount", format_currency(calc.applicable_amount)),
        kv("Monthly fee", format_currency(calc.monthly_fee)),
        kv("IVA", format_currency(calc.iva_amount)),
        kv("Total monthly cost", format_currency(calc.total_monthly_cost)),
        kv("Annual cost", format_currency(calc.annual_fee)),
        kv("Effective annual rate", format_percent(calc.effective_annual_rate)),
    ]));
    output.push('\n');

    output
}

/// Format a break-even analysis
pub fn format_break_even(analysis: &BreakEvenAnalysis, broker: &str) -> String {
    let mut output = format!(
        "\n{} Break-even over {} month(s) - {}\n\n",
        "📈".cyan().bold(),
        analysis.months,
        broker.bold()
    );

    let mut rows = vec![
        kv("Invested amount", format_currency(analysis.amount)),
        kv("Entry commission", format_currency(analysis.entry.total_commission)),
        kv("Custody", format_currency(analysis.total_custody)),
    ];
    if let Some(ref exit) = analysis.exit {
        rows.push(kv("Exit commission", format_currency(exit.total_commission)));
    }
    rows.push(kv("Total cost", format_currency(analysis.total_cost)));
    rows.push(kv("Final position value", format_currency(analysis.final_position_value)));
    output.push_str(&key_value_table(rows));

    output.push_str(&format!(
        "\n\n{:<28} {}\n",
        "Return needed to break even:".bold(),
        format_percent(analysis.break_even_pct).yellow().bold()
    ));
    if let Some(sale) = analysis.sale_amount_to_recover {
        output.push_str(&format!(
            "{:<28} {}\n",
            "Sale amount to recover:".bold(),
            format_currency(sale).cyan()
        ));
    }

    if analysis.total_custody > Decimal::ZERO {
        #[derive(Tabled)]
        struct MonthRow {
            #[tabled(rename = "Month")]
            month: u32,
            #[tabled(rename = "Position")]
            position: String,
            #[tabled(rename = "Custody")]
            custody: String,
            #[tabled(rename = "Cumulative")]
            cumulative: String,
        }

        let rows: Vec<MonthRow> = analysis
            .monthly
            .iter()
            .map(|m| MonthRow {
                month: m.month,
                position: format_currency(m.position_value),
                custody: format_currency(m.custody_cost),
                cumulative: format_currency(m.cumulative_cost),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        table.modify(Columns::new(1..), Alignment::right());
        output.push_str(&format!("\n{}\n", "Monthly projection:".bold()));
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output
}

/// Format the operation-size search
pub fn format_optimization(result: &OptimizationResult, broker: &str) -> String {
    let mut output = format!(
        "\n{} Operation size search - {} (target {})\n\n",
        "🔎".cyan().bold(),
        broker.bold(),
        format_percent(result.target_cost_pct)
    );

    if let Some(threshold) = result.buy_minimum_threshold {
        output.push_str(&format!(
            "  Minimum commission stops applying above {}\n",
            format_currency(threshold).cyan()
        ));
    }

    match result.smallest_within_target {
        Some(ref c) => output.push_str(&format!(
            "  {} Smallest amount within target: {} ({} total cost, {})\n",
            "✓".green().bold(),
            format_currency(c.amount).green().bold(),
            format_currency(c.total_cost),
            format_percent(c.break_even_pct)
        )),
        None => output.push_str(&format!(
            "  {} No scanned amount reaches the target\n",
            "✗".red().bold()
        )),
    }

    if let Some(ref c) = result.lowest_cost {
        output.push_str(&format!(
            "  Lowest relative cost: {} at {}\n",
            format_percent(c.break_even_pct).yellow(),
            format_currency(c.amount)
        ));
    }

    output
}

/// Format the broker list
pub fn format_brokers_table(configs: &[CommissionConfig]) -> String {
    #[derive(Tabled)]
    struct BrokerRow {
        #[tabled(rename = "Broker")]
        broker: String,
        #[tabled(rename = "Buy")]
        buy: String,
        #[tabled(rename = "Sell")]
        sell: String,
        #[tabled(rename = "IVA")]
        iva: String,
        #[tabled(rename = "Custody exempt")]
        exempt: String,
        #[tabled(rename = "Custody")]
        custody: String,
    }

    let rows: Vec<BrokerRow> = configs
        .iter()
        .map(|c| BrokerRow {
            broker: c.broker.clone(),
            buy: format!("{} (min {})", format_rate(c.buy.percentage), format_currency(c.buy.minimum)),
            sell: format!(
                "{} (min {})",
                format_rate(c.sell.percentage),
                format_currency(c.sell.minimum)
            ),
            iva: format_rate(c.buy.iva),
            exempt: format_currency(c.custody.exempt_amount),
            custody: format!(
                "{}/month (min {})",
                format_rate(c.custody.monthly_percentage),
                format_currency(c.custody.monthly_minimum)
            ),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.to_string()
}

/// Format a single broker configuration
pub fn format_broker_detail(config: &CommissionConfig) -> String {
    let mut output = format!("\n{} Broker {}\n\n", "🏦".cyan().bold(), config.broker.bold());
    output.push_str(&key_value_table(vec![
        kv("Buy percentage", format_rate(config.buy.percentage)),
        kv("Buy minimum", format_currency(config.buy.minimum)),
        kv("Buy IVA", format_rate(config.buy.iva)),
        kv("Sell percentage", format_rate(config.sell.percentage)),
        kv("Sell minimum", format_currency(config.sell.minimum)),
        kv("Sell IVA", format_rate(config.sell.iva)),
        kv("Custody exempt amount", format_currency(config.custody.exempt_amount)),
        kv("Custody monthly percentage", format_rate(config.custody.monthly_percentage)),
        kv("Custody monthly minimum", format_currency(config.custody.monthly_minimum)),
        kv("Custody IVA", format_rate(config.custody.iva)),
    ]));
    output.push('\n');
    output
}

/// Format the trade journal
pub fn format_trades_table(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return format!(
            "{} No trades found\nRecord one with: {} trades add <ticker> <buy|sell> <qty> <price> <date>\n",
            "ℹ".blue().bold(),
            "cedears".bold()
        );
    }

    #[derive(Tabled)]
    struct TradeRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Type")]
        op: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Commission")]
        commission: String,
        #[tabled(rename = "Net")]
        net: String,
        #[tabled(rename = "Broker")]
        broker: String,
    }

    let rows: Vec<TradeRow> = trades
        .iter()
        .map(|t| TradeRow {
            date: t.trade_date.format("%Y-%m-%d").to_string(),
            ticker: t.ticker.clone(),
            op: t.operation_type.as_str().to_string(),
            quantity: t.quantity.normalize().to_string(),
            price: format_currency(t.price),
            amount: format_currency(t.amount),
            commission: format_currency(t.total_commission),
            net: format_currency(t.net_amount),
            broker: t.broker.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(3..8), Alignment::right());

    let total: Decimal = trades.iter().map(|t| t.total_commission).sum();
    format!(
        "{}\n\n{:<20} {}\n",
        table,
        "Total commissions:".bold(),
        format_currency(total).yellow().bold()
    )
}

/// Format the annual commission report
pub fn format_commission_report(report: &CommissionReport) -> String {
    if report.monthly_summaries.is_empty() {
        return format!(
            "\n{} No trades found for year {}\n",
            "ℹ".blue().bold(),
            report.year
        );
    }

    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Buys")]
        buys: u32,
        #[tabled(rename = "Sells")]
        sells: u32,
        #[tabled(rename = "Volume")]
        volume: String,
        #[tabled(rename = "Commission")]
        base: String,
        #[tabled(rename = "IVA")]
        iva: String,
        #[tabled(rename = "Total")]
        total: String,
    }

    let rows: Vec<MonthRow> = report
        .monthly_summaries
        .iter()
        .map(|m| MonthRow {
            month: m.month_name.to_string(),
            buys: m.buy_count,
            sells: m.sell_count,
            volume: format_currency(m.volume),
            base: format_currency(m.base_commission),
            iva: format_currency(m.iva_amount),
            total: format_currency(m.total_commission),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    let mut output = format!(
        "\n{} Commission Report - {}\n\n{}\n",
        "📊".cyan().bold(),
        report.year,
        table
    );

    output.push_str(&format!("\n{} Annual Totals:\n", "📈".cyan().bold()));
    output.push_str(&format!("  Volume:      {}\n", format_currency(report.annual_volume).cyan()));
    output.push_str(&format!(
        "  Commission:  {}\n",
        format_currency(report.annual_base_commission)
    ));
    output.push_str(&format!("  IVA:         {}\n", format_currency(report.annual_iva)));
    output.push_str(&format!(
        "  {}       {}\n",
        "Total:".bold(),
        format_currency(report.annual_total_commission).yellow().bold()
    ));
    output.push_str(&format!(
        "  Effective:   {}\n",
        format_percent(report.effective_rate)
    ));

    if report.by_broker.len() > 1 {
        output.push_str(&format!("\n{}\n", "By broker:".bold()));
        for (broker, total) in &report.by_broker {
            output.push_str(&format!("  {:<16} {}\n", broker, format_currency(*total)));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commissions::presets::galicia;
    use crate::commissions::{calculate_custody, calculate_operation_commission, OperationType};
    use rust_decimal_macros::dec;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_commission_output_contains_figures() {
        plain();
        let calc = calculate_operation_commission(OperationType::Buy, dec!(10000), &galicia());
        let out = format_commission(&calc, "galicia");

        assert!(out.contains("BUY commission"));
        assert!(out.contains("$ 181,50"));
        assert!(out.contains("$ 10.181,50"));
        assert!(out.contains("broker minimum"));
    }

    #[test]
    fn test_exempt_custody_message() {
        plain();
        let calc = calculate_custody(dec!(800000), &galicia());
        let out = format_custody(&calc, "galicia");
        assert!(out.contains("no custody fee"));
    }

    #[test]
    fn test_empty_trades_message() {
        plain();
        let out = format_trades_table(&[]);
        assert!(out.contains("No trades found"));
    }

    #[test]
    fn test_brokers_table_shows_rates() {
        plain();
        let out = format_brokers_table(&[galicia()]);
        assert!(out.contains("galicia"));
        assert!(out.contains("0,5% (min $ 150,00)"));
        assert!(out.contains("0,25%/month"));
    }
}
