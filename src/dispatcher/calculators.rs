use anyhow::Result;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

use super::{open_database, print_json, resolve_commission_config, BrokerScoped};
use crate::cli::formatters;
use crate::commissions::{
    calculate_break_even, calculate_custody, calculate_operation_commission,
    optimize_operation_size, OperationType, OptimizationInput, ProjectionInput,
    MAX_PROJECTION_MONTHS,
};
use crate::config::AppConfig;
use crate::error::CedearsError;
use crate::utils::{parse_amount, parse_decimal};

/// Options shared by `break-even` and `optimize`
pub struct ProjectionArgs {
    pub months: Option<u32>,
    pub growth: Option<String>,
    pub holdings: Option<String>,
    pub include_exit: bool,
    pub broker: Option<String>,
}

/// Projection options after applying config defaults
#[derive(Debug)]
struct ResolvedProjection {
    months: u32,
    monthly_growth_rate: Decimal,
    other_holdings: Decimal,
}

fn resolve_projection(args: &ProjectionArgs, app_config: &AppConfig) -> Result<ResolvedProjection> {
    let months = args.months.unwrap_or(app_config.default_months);
    if months > MAX_PROJECTION_MONTHS {
        return Err(CedearsError::ValidationError(format!(
            "months must be at most {} (got {})",
            MAX_PROJECTION_MONTHS, months
        ))
        .into());
    }

    let monthly_growth_rate = match args.growth.as_deref() {
        Some(raw) => parse_decimal(raw, "growth")?,
        None => app_config.default_monthly_growth,
    };
    if monthly_growth_rate <= -Decimal::ONE {
        return Err(CedearsError::ValidationError(format!(
            "growth must be greater than -1 (got {})",
            monthly_growth_rate
        ))
        .into());
    }

    let other_holdings = match args.holdings.as_deref() {
        Some(raw) => parse_amount(raw, "holdings")?,
        None => Decimal::ZERO,
    };

    Ok(ResolvedProjection {
        months,
        monthly_growth_rate,
        other_holdings,
    })
}

pub fn parse_operation(input: &str) -> Result<OperationType> {
    OperationType::from_str(input).map_err(|_| {
        CedearsError::ValidationError(format!(
            "operation must be 'buy' or 'sell' (got '{}')",
            input
        ))
        .into()
    })
}

pub async fn dispatch_commission(
    operation: &str,
    amount_str: &str,
    broker: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let operation_type = parse_operation(operation)?;
    let amount = parse_amount(amount_str, "amount")?;

    let conn = open_database()?;
    let (_, config) = resolve_commission_config(&conn, broker)?;

    info!(
        "Calculating {} commission for {} with {}",
        operation_type.as_str(),
        amount,
        config.broker
    );
    let calc = calculate_operation_commission(operation_type, amount, &config);

    if json_output {
        print_json(&BrokerScoped {
            broker: &config.broker,
            result: &calc,
        })
    } else {
        print!("{}", formatters::format_commission(&calc, &config.broker));
        Ok(())
    }
}

pub async fn dispatch_custody(
    portfolio_value_str: &str,
    broker: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let portfolio_value = parse_amount(portfolio_value_str, "portfolio value")?;

    let conn = open_database()?;
    let (_, config) = resolve_commission_config(&conn, broker)?;

    info!("Calculating custody for {} with {}", portfolio_value, config.broker);
    let calc = calculate_custody(portfolio_value, &config);

    if json_output {
        print_json(&BrokerScoped {
            broker: &config.broker,
            result: &calc,
        })
    } else {
        print!("{}", formatters::format_custody(&calc, &config.broker));
        Ok(())
    }
}

pub async fn dispatch_break_even(
    args: ProjectionArgs,
    amount_str: &str,
    json_output: bool,
) -> Result<()> {
    let amount = parse_amount(amount_str, "amount")?;

    let conn = open_database()?;
    let (app_config, config) = resolve_commission_config(&conn, args.broker.as_deref())?;
    let projection = resolve_projection(&args, &app_config)?;

    info!(
        "Projecting {} over {} months with {}",
        amount, projection.months, config.broker
    );
    let analysis = calculate_break_even(
        &ProjectionInput {
            amount,
            months: projection.months,
            monthly_growth_rate: projection.monthly_growth_rate,
            other_holdings: projection.other_holdings,
            include_exit_commission: args.include_exit,
        },
        &config,
    )?;

    if json_output {
        print_json(&BrokerScoped {
            broker: &config.broker,
            result: &analysis,
        })
    } else {
        print!("{}", formatters::format_break_even(&analysis, &config.broker));
        Ok(())
    }
}

pub async fn dispatch_optimize(
    args: ProjectionArgs,
    target_pct_str: &str,
    step_str: &str,
    max_str: &str,
    json_output: bool,
) -> Result<()> {
    let target_cost_pct = parse_amount(target_pct_str, "target percentage")?;
    let step = parse_amount(step_str, "step")?;
    let max_amount = parse_amount(max_str, "max")?;

    let conn = open_database()?;
    let (app_config, config) = resolve_commission_config(&conn, args.broker.as_deref())?;
    let projection = resolve_projection(&args, &app_config)?;

    info!(
        "Optimizing operation size up to {} in steps of {} with {}",
        max_amount, step, config.broker
    );
    let result = optimize_operation_size(
        &config,
        &OptimizationInput {
            target_cost_pct,
            months: projection.months,
            monthly_growth_rate: projection.monthly_growth_rate,
            other_holdings: projection.other_holdings,
            include_exit_commission: args.include_exit,
            step,
            max_amount,
        },
    )?;

    if json_output {
        print_json(&BrokerScoped {
            broker: &config.broker,
            result: &result,
        })
    } else {
        print!("{}", formatters::format_optimization(&result, &config.broker));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(growth: Option<&str>, holdings: Option<&str>) -> ProjectionArgs {
        ProjectionArgs {
            months: None,
            growth: growth.map(str::to_string),
            holdings: holdings.map(str::to_string),
            include_exit: true,
            broker: None,
        }
    }

    #[test]
    fn test_resolve_projection_uses_config_defaults() {
        let app_config = AppConfig {
            default_months: 6,
            default_monthly_growth: dec!(0.01),
            ..AppConfig::default()
        };
        let resolved = resolve_projection(&args(None, None), &app_config).unwrap();
        assert_eq!(resolved.months, 6);
        assert_eq!(resolved.monthly_growth_rate, dec!(0.01));
        assert_eq!(resolved.other_holdings, Decimal::ZERO);
    }

    #[test]
    fn test_resolve_projection_flags_override() {
        let resolved =
            resolve_projection(&args(Some("-0.02"), Some("500000")), &AppConfig::default()).unwrap();
        assert_eq!(resolved.monthly_growth_rate, dec!(-0.02));
        assert_eq!(resolved.other_holdings, dec!(500000));
    }

    #[test]
    fn test_resolve_projection_rejects_total_loss_growth() {
        assert!(resolve_projection(&args(Some("-1"), None), &AppConfig::default()).is_err());
        assert!(resolve_projection(&args(None, Some("-10")), &AppConfig::default()).is_err());
    }

    #[test]
    fn test_resolve_projection_caps_months() {
        let mut long = args(None, None);
        long.months = Some(4_000_000_000);
        let err = resolve_projection(&long, &AppConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CedearsError>(),
            Some(CedearsError::ValidationError(_))
        ));

        let from_config = AppConfig {
            default_months: 5000,
            ..AppConfig::default()
        };
        assert!(resolve_projection(&args(None, None), &from_config).is_err());

        long.months = Some(MAX_PROJECTION_MONTHS);
        assert!(resolve_projection(&long, &AppConfig::default()).is_ok());
    }

    #[test]
    fn test_parse_operation() {
        assert_eq!(parse_operation("buy").unwrap(), OperationType::Buy);
        assert_eq!(parse_operation("Venta").unwrap(), OperationType::Sell);
        assert!(parse_operation("hold").is_err());
    }
}
