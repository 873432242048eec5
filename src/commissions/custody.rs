use rust_decimal::Decimal;

use super::models::{CommissionConfig, CustodyCalculation, MAX_AMOUNT};
use super::operation::percentage_of;

const MONTHS_PER_YEAR: i64 = 12;

/// Calculate the monthly custody fee for a portfolio value.
///
/// Portfolios at or below the exempt amount pay nothing (negative values
/// included). Above it, the fee is charged on the excess only and floored
/// at the monthly minimum. Values above `MAX_AMOUNT` are clamped to it.
pub fn calculate_custody(portfolio_value: Decimal, config: &CommissionConfig) -> CustodyCalculation {
    let custody = &config.custody;
    let portfolio_value = portfolio_value.min(MAX_AMOUNT);

    let is_exempt = portfolio_value <= custody.exempt_amount;
    let applicable_amount = (portfolio_value - custody.exempt_amount).max(Decimal::ZERO);

    let monthly_fee = if is_exempt {
        Decimal::ZERO
    } else {
        (applicable_amount * custody.monthly_percentage).max(custody.monthly_minimum)
    };

    let iva_amount = monthly_fee * custody.iva;
    let total_monthly_cost = monthly_fee + iva_amount;
    let annual_fee = total_monthly_cost * Decimal::from(MONTHS_PER_YEAR);

    let effective_annual_rate = if is_exempt {
        Decimal::ZERO
    } else {
        percentage_of(annual_fee, portfolio_value)
    };

    CustodyCalculation {
        portfolio_value,
        exempt_amount: custody.exempt_amount,
        is_exempt,
        applicable_amount,
        monthly_fee,
        iva_amount,
        total_monthly_cost,
        annual_fee,
        effective_annual_rate,
    }
}

/// Custody cost (IVA included) for one month, as charged on the whole portfolio
pub fn monthly_custody_cost(portfolio_value: Decimal, config: &CommissionConfig) -> Decimal {
    calculate_custody(portfolio_value, config).total_monthly_cost
}
