use crate::error::AnalyticsError;
use crate::report::{AssetReport, ConstituentReport, PortfolioReport};
use crate::returns::{annualize, cumulative_return, mean, portfolio_mean_return, TRADING_DAYS_PER_YEAR};
use core_types::{AssetSeries, PortfolioSeries};

/// A stateless calculator for deriving return statistics from asset series.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine {
    trading_days: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(TRADING_DAYS_PER_YEAR)
    }
}

impl AnalyticsEngine {
    pub fn new(trading_days: u32) -> Self {
        Self { trading_days }
    }

    pub fn trading_days(&self) -> u32 {
        self.trading_days
    }

    /// Computes daily, cumulative and annualized returns for one asset.
    ///
    /// # Errors
    ///
    /// `AnalyticsError::EmptyInput` if the series has no records.
    pub fn analyze_asset(&self, series: &AssetSeries) -> Result<AssetReport, AnalyticsError> {
        let (Some(first_time), Some(last_time)) = (series.first_time(), series.last_time()) else {
            return Err(AnalyticsError::EmptyInput(format!(
                "asset returns for {}",
                series.symbol()
            )));
        };

        let daily_returns = series.daily_returns();
        let mean_daily_return = mean(&daily_returns)?;
        let cumulative_returns = cumulative_return(&daily_returns);
        let final_cumulative_return = final_value(&cumulative_returns, "cumulative return")?;

        tracing::debug!(
            symbol = %series.symbol(),
            rows = series.len(),
            mean_daily_return,
            "Analyzed asset series."
        );

        Ok(AssetReport {
            symbol: series.symbol().clone(),
            first_time,
            last_time,
            trading_days: series.len(),
            times: series.times(),
            daily_returns,
            cumulative_returns,
            mean_daily_return,
            annualized_return: annualize(mean_daily_return, self.trading_days),
            final_cumulative_return,
        })
    }

    /// Computes the equally weighted portfolio return and its statistics, along
    /// with each constituent's curve over the same timestamps.
    ///
    /// # Errors
    ///
    /// `AnalyticsError::MissingColumns` if the portfolio has no constituents,
    /// `AnalyticsError::EmptyInput` if it has no rows.
    pub fn analyze_portfolio(
        &self,
        portfolio: &PortfolioSeries,
    ) -> Result<PortfolioReport, AnalyticsError> {
        let daily_returns = portfolio_mean_return(portfolio)?;
        if daily_returns.is_empty() {
            return Err(AnalyticsError::EmptyInput("portfolio returns".to_string()));
        }

        let mean_daily_return = mean(&daily_returns)?;
        let cumulative_returns = cumulative_return(&daily_returns);
        let final_cumulative_return = final_value(&cumulative_returns, "cumulative return")?;

        let constituents = portfolio
            .symbols()
            .iter()
            .enumerate()
            .map(|(i, symbol)| {
                let column = portfolio.column(i).unwrap_or_default();
                Ok(ConstituentReport {
                    symbol: symbol.clone(),
                    cumulative_returns: cumulative_return(&column),
                    annualized_return: annualize(mean(&column)?, self.trading_days),
                })
            })
            .collect::<Result<Vec<_>, AnalyticsError>>()?;

        tracing::debug!(
            constituents = constituents.len(),
            rows = portfolio.len(),
            mean_daily_return,
            "Analyzed portfolio."
        );

        Ok(PortfolioReport {
            times: portfolio.times().to_vec(),
            constituents,
            daily_returns,
            cumulative_returns,
            mean_daily_return,
            annualized_return: annualize(mean_daily_return, self.trading_days),
            final_cumulative_return,
        })
    }
}

fn final_value(values: &[f64], metric: &str) -> Result<f64, AnalyticsError> {
    match values.last() {
        Some(v) if v.is_finite() => Ok(*v),
        Some(_) => Err(AnalyticsError::NonFinite(metric.to_string())),
        None => Err(AnalyticsError::EmptyInput(metric.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};
    use core_types::{AssetRecord, Symbol};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 5, d)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    fn asset(symbol: &str, returns: &[f64]) -> AssetSeries {
        let records = returns
            .iter()
            .enumerate()
            .map(|(i, r)| AssetRecord {
                time: day(i as u32 + 1),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.5,
                daily_return: *r,
            })
            .collect();
        AssetSeries::new(Symbol::new(symbol).unwrap(), records).unwrap()
    }

    #[test]
    fn asset_report() {
        let engine = AnalyticsEngine::default();
        let report = engine.analyze_asset(&asset("PYPL", &[0.01, -0.02, 0.03])).unwrap();

        assert_eq!(report.trading_days, 3);
        assert_eq!(report.first_time, day(1));
        assert_eq!(report.last_time, day(3));
        assert_eq!(report.cumulative_returns.len(), 3);
        assert_relative_eq!(report.final_cumulative_return, 1.019494, epsilon = 1e-12);
        assert_relative_eq!(
            report.annualized_return,
            (0.01 - 0.02 + 0.03) / 3.0 * 252.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            report.annualized_return_pct(),
            report.annualized_return * 100.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_asset_is_an_error() {
        let engine = AnalyticsEngine::default();
        let err = engine.analyze_asset(&asset("GS", &[])).unwrap_err();
        assert!(matches!(err, AnalyticsError::EmptyInput(_)));
    }

    #[test]
    fn portfolio_report_with_equal_constituents() {
        let symbols: Vec<Symbol> = ["GDOT", "GS", "PYPL", "SQ"]
            .iter()
            .map(|s| Symbol::new(*s).unwrap())
            .collect();
        let rows = vec![vec![0.01; 4], vec![-0.02; 4], vec![0.03; 4]];
        let portfolio =
            PortfolioSeries::new(symbols, vec![day(1), day(2), day(3)], rows).unwrap();

        let report = AnalyticsEngine::default().analyze_portfolio(&portfolio).unwrap();

        let expected_cumulative = [1.01, 0.9898, 1.019494];
        for (got, want) in report.cumulative_returns.iter().zip(expected_cumulative) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert_relative_eq!(
            report.annualized_return,
            (0.01 - 0.02 + 0.03) / 3.0 * 252.0,
            epsilon = 1e-12
        );
        assert_eq!(report.constituents.len(), 4);
        for constituent in &report.constituents {
            assert_eq!(constituent.cumulative_returns.len(), 3);
            assert_relative_eq!(
                constituent.annualized_return,
                report.annualized_return,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn portfolio_uses_configured_trading_days() {
        let symbols = vec![Symbol::new("A").unwrap(), Symbol::new("B").unwrap()];
        let portfolio =
            PortfolioSeries::new(symbols, vec![day(1)], vec![vec![0.01, 0.03]]).unwrap();

        let report = AnalyticsEngine::new(12).analyze_portfolio(&portfolio).unwrap();
        assert_relative_eq!(report.annualized_return, 0.02 * 12.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_portfolio_is_an_error() {
        let symbols = vec![Symbol::new("A").unwrap()];
        let portfolio = PortfolioSeries::new(symbols, vec![], vec![]).unwrap();
        let err = AnalyticsEngine::default().analyze_portfolio(&portfolio).unwrap_err();
        assert_eq!(err, AnalyticsError::EmptyInput("portfolio returns".to_string()));
    }
}
