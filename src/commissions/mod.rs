// Commissions module - broker operation fees, custody fees and break-even analysis

pub mod break_even;
pub mod custody;
pub mod models;
pub mod operation;
pub mod presets;

pub use break_even::{
    break_even_sale_amount, calculate_break_even, minimum_threshold, optimize_operation_size,
    BreakEvenAnalysis, OptimizationInput, OptimizationResult, ProjectionInput,
    MAX_PROJECTION_MONTHS,
};
pub use custody::calculate_custody;
pub use models::{
    CommissionCalculation, CommissionConfig, CustodyCalculation, CustodyFees, OperationFees,
    OperationType, MAX_AMOUNT,
};
pub use operation::calculate_operation_commission;
