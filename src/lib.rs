//! CEDEARs - broker commission and custody calculator for Argentine CEDEARs
//!
//! This library computes buy/sell commissions with IVA, monthly custody fees
//! and break-even returns for a holding period, and keeps a journal of the
//! commissions paid on recorded trades.

pub mod cli;
pub mod commissions;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod reports;
pub mod trades;
pub mod utils;
