// Reports module - commission reports built from the trade journal

pub mod commissions;

pub use commissions::{export_to_csv, generate_commission_report, CommissionReport};
