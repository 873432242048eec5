//! Application configuration
//!
//! Reads the optional `~/.cedears/config.toml` and broker definition files.
//! Every field has a default, so a missing config file is not an error.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::commissions::presets::DEFAULT_BROKER;
use crate::commissions::CommissionConfig;
use crate::error::CedearsError;

/// Environment variable overriding the default broker
pub const BROKER_ENV_VAR: &str = "CEDEARS_BROKER";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub default_broker: String,
    /// Holding period used by `break-even` and `optimize` when `--months` is omitted
    pub default_months: u32,
    /// Monthly growth used by projections when `--growth` is omitted
    pub default_monthly_growth: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_broker: DEFAULT_BROKER.to_string(),
            default_months: 12,
            default_monthly_growth: Decimal::ZERO,
        }
    }
}

impl AppConfig {
    /// Parse config TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| CedearsError::ConfigError(e.to_string()).into())
    }

    /// Load from a path; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(path).map_err(CedearsError::Io)?;
        let config = Self::from_toml_str(&content)
            .context(format!("Failed to parse config file {:?}", path))?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load `~/.cedears/config.toml`
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path()?)
    }

    /// Resolve the broker to use: explicit flag, then environment, then config file
    pub fn resolve_broker(&self, flag: Option<&str>) -> String {
        let env_value = std::env::var(BROKER_ENV_VAR).ok();
        resolve_broker_with(flag, env_value.as_deref(), &self.default_broker)
    }
}

fn resolve_broker_with(flag: Option<&str>, env_value: Option<&str>, configured: &str) -> String {
    flag.or(env_value)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(configured)
        .to_lowercase()
}

/// Path of the application config file (~/.cedears/config.toml)
pub fn default_config_path() -> Result<PathBuf> {
    Ok(crate::db::get_app_dir()?.join("config.toml"))
}

/// Broker definition file: one `[[broker]]` table per broker
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BrokerFile {
    #[serde(default)]
    broker: Vec<CommissionConfig>,
}

/// Parse broker commission configs from TOML text
pub fn parse_broker_file(content: &str) -> Result<Vec<CommissionConfig>> {
    let file: BrokerFile =
        toml::from_str(content).map_err(|e| CedearsError::ConfigError(e.to_string()))?;

    if file.broker.is_empty() {
        return Err(CedearsError::ConfigError("no [[broker]] entries found".to_string()).into());
    }

    Ok(file.broker)
}

/// Read and parse a broker definition file
pub fn load_broker_file(path: &Path) -> Result<Vec<CommissionConfig>> {
    let content = std::fs::read_to_string(path)
        .map_err(CedearsError::Io)
        .context(format!("Failed to read broker file {:?}", path))?;
    parse_broker_file(&content).context(format!("Invalid broker file {:?}", path))
}
