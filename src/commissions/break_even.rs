//! Break-even analysis and operation-size optimization
//!
//! Composes the operation and custody calculators over a holding period:
//! one buy commission on entry, the custody fee attributable to the position
//! for every month held, and optionally the sell commission on exit.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use super::custody::monthly_custody_cost;
use super::models::{
    CommissionCalculation, CommissionConfig, OperationFees, OperationType, MAX_AMOUNT,
};
use super::operation::{calculate_operation_commission, percentage_of};
use crate::error::CedearsError;

/// Upper bound on the number of amounts scanned by [`optimize_operation_size`]
pub const MAX_OPTIMIZATION_CANDIDATES: usize = 10_000;

/// Longest holding period a projection accepts (100 years)
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

/// Parameters of a holding-period projection
#[derive(Debug, Clone)]
pub struct ProjectionInput {
    pub amount: Decimal,
    pub months: u32,
    /// Monthly growth of the position value (0.01 = 1% per month)
    pub monthly_growth_rate: Decimal,
    /// Value of the rest of the portfolio, which shares the custody threshold
    pub other_holdings: Decimal,
    pub include_exit_commission: bool,
}

impl ProjectionInput {
    pub fn new(amount: Decimal, months: u32) -> Self {
        Self {
            amount,
            months,
            monthly_growth_rate: Decimal::ZERO,
            other_holdings: Decimal::ZERO,
            include_exit_commission: true,
        }
    }
}

/// One month of a projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedMonth {
    pub month: u32,
    pub position_value: Decimal,
    pub portfolio_value: Decimal,
    /// Custody (IVA included) charged because of the position this month
    pub custody_cost: Decimal,
    pub cumulative_cost: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakEvenAnalysis {
    pub amount: Decimal,
    pub months: u32,
    pub entry: CommissionCalculation,
    pub exit: Option<CommissionCalculation>,
    pub monthly: Vec<ProjectedMonth>,
    pub total_custody: Decimal,
    pub total_cost: Decimal,
    /// Return over the invested amount needed to offset `total_cost`
    pub break_even_pct: Decimal,
    pub final_position_value: Decimal,
    /// Gross sale amount whose net proceeds recover amount, entry commission and custody
    pub sale_amount_to_recover: Option<Decimal>,
}

/// Project entry, custody and exit costs of holding a position.
///
/// Custody is a whole-portfolio fee, so only the marginal cost over what
/// `other_holdings` already pays is attributed to the position. Negative
/// amounts and holdings are clamped to zero. Horizons above
/// [`MAX_PROJECTION_MONTHS`] and positions that grow past [`MAX_AMOUNT`]
/// are rejected with a validation error.
pub fn calculate_break_even(
    input: &ProjectionInput,
    config: &CommissionConfig,
) -> Result<BreakEvenAnalysis> {
    if input.months > MAX_PROJECTION_MONTHS {
        return Err(CedearsError::ValidationError(format!(
            "months must be at most {} (got {})",
            MAX_PROJECTION_MONTHS, input.months
        ))
        .into());
    }

    let amount = input.amount.clamp(Decimal::ZERO, MAX_AMOUNT);
    let other_holdings = input.other_holdings.clamp(Decimal::ZERO, MAX_AMOUNT);
    let growth_factor = Decimal::ONE
        .checked_add(input.monthly_growth_rate)
        .ok_or_else(|| position_overflow(1))?
        .max(Decimal::ZERO);

    let entry = calculate_operation_commission(OperationType::Buy, amount, config);
    let baseline_custody = monthly_custody_cost(other_holdings, config);

    let mut position_value = amount;
    let mut cumulative_cost = entry.total_commission;
    let mut total_custody = Decimal::ZERO;
    let mut monthly = Vec::new();

    for month in 1..=input.months {
        position_value = position_value
            .checked_mul(growth_factor)
            .filter(|value| *value <= MAX_AMOUNT)
            .ok_or_else(|| position_overflow(month))?;
        let portfolio_value = other_holdings + position_value;
        let custody_cost =
            (monthly_custody_cost(portfolio_value, config) - baseline_custody).max(Decimal::ZERO);

        total_custody = checked_cost(total_custody.checked_add(custody_cost))?;
        cumulative_cost = checked_cost(cumulative_cost.checked_add(custody_cost))?;

        monthly.push(ProjectedMonth {
            month,
            position_value,
            portfolio_value,
            custody_cost,
            cumulative_cost,
        });
    }

    let exit = input
        .include_exit_commission
        .then(|| calculate_operation_commission(OperationType::Sell, position_value, config));
    if let Some(ref exit) = exit {
        cumulative_cost = checked_cost(cumulative_cost.checked_add(exit.total_commission))?;
    }

    let break_even_pct = percentage_of(cumulative_cost, amount);

    let recovery_target = checked_cost(
        amount
            .checked_add(entry.total_commission)
            .and_then(|v| v.checked_add(total_custody)),
    )?;
    let sale_amount_to_recover = break_even_sale_amount(recovery_target, config);

    Ok(BreakEvenAnalysis {
        amount,
        months: input.months,
        entry,
        exit,
        monthly,
        total_custody,
        total_cost: cumulative_cost,
        break_even_pct,
        final_position_value: position_value,
        sale_amount_to_recover,
    })
}

fn position_overflow(month: u32) -> anyhow::Error {
    CedearsError::ValidationError(format!(
        "projected position exceeds {} in month {}; use a lower growth or a shorter horizon",
        MAX_AMOUNT, month
    ))
    .into()
}

fn checked_cost(value: Option<Decimal>) -> Result<Decimal> {
    value.ok_or_else(|| {
        CedearsError::ValidationError("projected cost is too large to represent".to_string()).into()
    })
}

/// Gross sell amount whose net proceeds equal `target_net`.
///
/// Solved against both commission branches: the minimum branch first, then
/// the percentage branch. Returns `None` when the sell commission would eat
/// the whole operation (`percentage * (1 + iva) >= 1`).
pub fn break_even_sale_amount(target_net: Decimal, config: &CommissionConfig) -> Option<Decimal> {
    let fees = &config.sell;
    let target_net = target_net.max(Decimal::ZERO);
    let iva_factor = Decimal::ONE + fees.iva;

    let with_minimum = target_net + fees.minimum * iva_factor;
    if with_minimum * fees.percentage <= fees.minimum {
        return Some(with_minimum);
    }

    let net_fraction = Decimal::ONE - fees.percentage * iva_factor;
    if net_fraction <= Decimal::ZERO {
        return None;
    }

    target_net.checked_div(net_fraction)
}

/// Operation amount above which the percentage commission exceeds the minimum
pub fn minimum_threshold(fees: &OperationFees) -> Option<Decimal> {
    if fees.percentage.is_zero() {
        return None;
    }
    Some(fees.minimum / fees.percentage)
}

/// Parameters of the operation-size search
#[derive(Debug, Clone)]
pub struct OptimizationInput {
    /// Acceptable break-even percentage (1.5 = 1.5%)
    pub target_cost_pct: Decimal,
    pub months: u32,
    pub monthly_growth_rate: Decimal,
    pub other_holdings: Decimal,
    pub include_exit_commission: bool,
    pub step: Decimal,
    pub max_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptimizationCandidate {
    pub amount: Decimal,
    pub total_cost: Decimal,
    pub break_even_pct: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub target_cost_pct: Decimal,
    pub candidates: Vec<OptimizationCandidate>,
    /// Smallest scanned amount whose break-even is within the target
    pub smallest_within_target: Option<OptimizationCandidate>,
    /// Scanned amount with the lowest break-even (smallest amount on ties)
    pub lowest_cost: Option<OptimizationCandidate>,
    pub buy_minimum_threshold: Option<Decimal>,
}

/// Scan operation sizes `step, 2 * step, ..., <= max_amount` and find the
/// cheapest ones relative to their size.
pub fn optimize_operation_size(
    config: &CommissionConfig,
    input: &OptimizationInput,
) -> Result<OptimizationResult> {
    if input.step <= Decimal::ZERO {
        return Err(CedearsError::ValidationError("step must be greater than zero".to_string()).into());
    }
    if input.max_amount < input.step {
        return Err(CedearsError::ValidationError(
            "max amount must be at least one step".to_string(),
        )
        .into());
    }

    let steps = (input.max_amount / input.step).floor();
    if steps > Decimal::from(MAX_OPTIMIZATION_CANDIDATES) {
        return Err(CedearsError::ValidationError(format!(
            "search would scan {} amounts (limit {}); use a larger step",
            steps, MAX_OPTIMIZATION_CANDIDATES
        ))
        .into());
    }

    let mut candidates = Vec::new();
    let mut smallest_within_target: Option<OptimizationCandidate> = None;
    let mut lowest_cost: Option<OptimizationCandidate> = None;

    let mut amount = input.step;
    while amount <= input.max_amount {
        let analysis = calculate_break_even(
            &ProjectionInput {
                amount,
                months: input.months,
                monthly_growth_rate: input.monthly_growth_rate,
                other_holdings: input.other_holdings,
                include_exit_commission: input.include_exit_commission,
            },
            config,
        )?;

        let candidate = OptimizationCandidate {
            amount,
            total_cost: analysis.total_cost,
            break_even_pct: analysis.break_even_pct,
        };

        if smallest_within_target.is_none() && candidate.break_even_pct <= input.target_cost_pct {
            smallest_within_target = Some(candidate.clone());
        }
        let is_lower = lowest_cost
            .as_ref()
            .is_none_or(|best| candidate.break_even_pct < best.break_even_pct);
        if is_lower {
            lowest_cost = Some(candidate.clone());
        }

        candidates.push(candidate);
        amount += input.step;
    }

    Ok(OptimizationResult {
        target_cost_pct: input.target_cost_pct,
        candidates,
        smallest_within_target,
        lowest_cost,
        buy_minimum_threshold: minimum_threshold(&config.buy),
    })
}
