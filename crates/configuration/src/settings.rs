use crate::error::ConfigError;
use core_types::{NumericField, Symbol};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseSettings,
    pub portfolio: PortfolioSettings,
    #[serde(default)]
    pub queries: QuerySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the asset tables live.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// An sqlx SQLite URL, e.g. `sqlite://etf.db`.
    pub url: String,
    /// Pool size. The analysis is sequential, so one connection is enough.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// The assets that make up the equally weighted portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioSettings {
    pub symbols: Vec<Symbol>,
    #[serde(default = "default_trading_days")]
    pub trading_days_per_year: u32,
}

/// Defaults for the single-asset queries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// The asset analysed by the single-asset commands.
    pub symbol: Symbol,
    pub filter_field: NumericField,
    /// Rows strictly above this value are returned by the filtered scan.
    pub threshold: f64,
    pub top_field: NumericField,
    pub top_n: u32,
    /// Rows shown by the head/tail review.
    pub preview_rows: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            symbol: Symbol::new("PYPL").unwrap(),
            filter_field: NumericField::Close,
            threshold: 200.0,
            top_field: NumericField::DailyReturns,
            top_n: 10,
            preview_rows: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file here.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}

fn default_max_connections() -> u32 {
    1
}

fn default_trading_days() -> u32 {
    252
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "etf-analyzer.log".to_string()
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.portfolio.symbols.is_empty() {
            return Err(ConfigError::ValidationError(
                "portfolio.symbols must list at least one asset".to_string(),
            ));
        }
        if self.portfolio.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "portfolio.trading_days_per_year must be positive".to_string(),
            ));
        }
        if !self.queries.threshold.is_finite() {
            return Err(ConfigError::ValidationError(
                "queries.threshold must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}
