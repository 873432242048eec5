use rust_decimal::Decimal;

use super::models::{CommissionCalculation, CommissionConfig, OperationType, MAX_AMOUNT};

/// Calculate the commission of a single buy or sell operation.
///
/// The base commission is the greater of `amount * percentage` and the
/// broker minimum; IVA is charged on top of it. Buys add the commission to
/// the amount, sells subtract it. Amounts are clamped to `0..=MAX_AMOUNT`.
pub fn calculate_operation_commission(
    operation_type: OperationType,
    amount: Decimal,
    config: &CommissionConfig,
) -> CommissionCalculation {
    let fees = config.fees_for(operation_type);
    let amount = amount.clamp(Decimal::ZERO, MAX_AMOUNT);

    let percentage_commission = amount * fees.percentage;
    let minimum_applied = percentage_commission < fees.minimum;
    let base_commission = percentage_commission.max(fees.minimum);

    let iva_amount = base_commission * fees.iva;
    let total_commission = base_commission + iva_amount;

    let net_amount = match operation_type {
        OperationType::Buy => amount + total_commission,
        OperationType::Sell => amount - total_commission,
    };

    let effective_rate = percentage_of(total_commission, amount);

    CommissionCalculation {
        operation_type,
        amount,
        base_commission,
        iva_amount,
        total_commission,
        net_amount,
        minimum_applied,
        effective_rate,
    }
}

/// `part` as a percentage of `whole`; zero when `whole` is not positive and
/// `Decimal::MAX` when the ratio does not fit (fractions of a cent).
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::MAX)
}
