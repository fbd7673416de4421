use chrono::NaiveDateTime;
use core_types::Symbol;
use serde::{Deserialize, Serialize};

/// Return statistics for a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReport {
    pub symbol: Symbol,
    pub first_time: NaiveDateTime,
    pub last_time: NaiveDateTime,
    pub trading_days: usize,
    pub times: Vec<NaiveDateTime>,
    pub daily_returns: Vec<f64>,
    pub cumulative_returns: Vec<f64>,
    pub mean_daily_return: f64,
    pub annualized_return: f64,
    /// Growth of one unit invested at the start of the series.
    pub final_cumulative_return: f64,
}

/// One constituent's contribution to a `PortfolioReport`, restricted to the
/// joined timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentReport {
    pub symbol: Symbol,
    pub cumulative_returns: Vec<f64>,
    pub annualized_return: f64,
}

/// Return statistics for an equally weighted portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub times: Vec<NaiveDateTime>,
    pub constituents: Vec<ConstituentReport>,
    /// Row-wise mean of the constituents' daily returns.
    pub daily_returns: Vec<f64>,
    pub cumulative_returns: Vec<f64>,
    pub mean_daily_return: f64,
    pub annualized_return: f64,
    pub final_cumulative_return: f64,
}

impl PortfolioReport {
    pub fn annualized_return_pct(&self) -> f64 {
        self.annualized_return * 100.0
    }
}

impl AssetReport {
    pub fn annualized_return_pct(&self) -> f64 {
        self.annualized_return * 100.0
    }
}
