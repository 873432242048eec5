//! Error handling for CEDEARs Manager
//!
//! Defines the typed domain errors and a unified Result type using anyhow
//! for context chaining and error propagation.

use thiserror::Error;

/// Core error types for commission and trade operations
#[derive(Error, Debug)]
pub enum CedearsError {
    #[error("database error: {0}")]
    DbError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("broker not found: {0}")]
    BrokerNotFound(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application operations
pub type Result<T> = anyhow::Result<T>;
