use crate::error::AnalyticsError;
use core_types::PortfolioSeries;

/// Trading days in a year, used for simple annualization.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Arithmetic mean of `values`.
///
/// Errors instead of returning NaN when `values` is empty or contains a
/// non-finite number.
pub fn mean(values: &[f64]) -> Result<f64, AnalyticsError> {
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput("mean".to_string()));
    }
    let result = values.iter().sum::<f64>() / values.len() as f64;
    if !result.is_finite() {
        return Err(AnalyticsError::NonFinite("mean".to_string()));
    }
    Ok(result)
}

/// Running product of `1 + r`. The output has the same length as the input
/// and starts at `1 + returns[0]`.
pub fn cumulative_return(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth)
        })
        .collect()
}

/// Simple annualization: `mean_daily_return * trading_days`.
///
/// This is linear scaling, not geometric compounding.
pub fn annualize(mean_daily_return: f64, trading_days: u32) -> f64 {
    mean_daily_return * f64::from(trading_days)
}

/// `annualize(mean(returns), trading_days)`.
pub fn annualized_return(returns: &[f64], trading_days: u32) -> Result<f64, AnalyticsError> {
    Ok(annualize(mean(returns)?, trading_days))
}

/// Equal-weighted portfolio return: the row-wise mean across all constituent
/// return columns.
pub fn portfolio_mean_return(portfolio: &PortfolioSeries) -> Result<Vec<f64>, AnalyticsError> {
    if portfolio.symbols().is_empty() {
        return Err(AnalyticsError::MissingColumns);
    }
    portfolio.rows().iter().map(|row| mean(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};
    use core_types::Symbol;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn portfolio(symbols: &[&str], rows: Vec<Vec<f64>>) -> PortfolioSeries {
        let symbols = symbols.iter().map(|s| Symbol::new(*s).unwrap()).collect();
        let times = (1..=rows.len() as u32).map(day).collect();
        PortfolioSeries::new(symbols, times, rows).unwrap()
    }

    #[test]
    fn mean_of_empty_is_an_error() {
        assert_eq!(
            mean(&[]),
            Err(AnalyticsError::EmptyInput("mean".to_string()))
        );
    }

    #[test]
    fn mean_rejects_nan() {
        assert_eq!(
            mean(&[0.1, f64::NAN]),
            Err(AnalyticsError::NonFinite("mean".to_string()))
        );
    }

    #[test]
    fn cumulative_return_compounds() {
        let returns = [0.01, -0.02, 0.03];
        let cumulative = cumulative_return(&returns);

        assert_eq!(cumulative.len(), returns.len());
        assert_relative_eq!(cumulative[0], 1.01, epsilon = 1e-12);
        assert_relative_eq!(cumulative[1], 0.9898, epsilon = 1e-12);
        assert_relative_eq!(cumulative[2], 1.019494, epsilon = 1e-12);
        for i in 1..cumulative.len() {
            assert_relative_eq!(
                cumulative[i],
                cumulative[i - 1] * (1.0 + returns[i]),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn cumulative_return_of_empty_is_empty() {
        assert!(cumulative_return(&[]).is_empty());
    }

    #[test]
    fn annualize_is_linear() {
        let daily = 0.000_731;
        assert_eq!(annualize(daily, 252), daily * 252.0);
        assert_eq!(annualize(daily, TRADING_DAYS_PER_YEAR), daily * 252.0);
        assert_eq!(annualize(-0.01, 1), -0.01);
    }

    #[test]
    fn annualized_return_of_empty_is_an_error() {
        assert!(matches!(
            annualized_return(&[], TRADING_DAYS_PER_YEAR),
            Err(AnalyticsError::EmptyInput(_))
        ));
    }

    #[test]
    fn portfolio_mean_is_row_wise() {
        let p = portfolio(&["A", "B"], vec![vec![0.02, 0.04], vec![-0.01, 0.03]]);
        let means = portfolio_mean_return(&p).unwrap();
        assert_relative_eq!(means[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(means[1], 0.01, epsilon = 1e-12);
    }

    #[test]
    fn portfolio_mean_without_columns_is_an_error() {
        let p = PortfolioSeries::new(vec![], vec![], vec![]).unwrap();
        assert_eq!(
            portfolio_mean_return(&p),
            Err(AnalyticsError::MissingColumns)
        );
    }

    #[test]
    fn identical_constituents_pass_through() {
        let rows = vec![vec![0.01; 4], vec![-0.02; 4], vec![0.03; 4]];
        let p = portfolio(&["GDOT", "GS", "PYPL", "SQ"], rows);

        let daily = portfolio_mean_return(&p).unwrap();
        assert_relative_eq!(daily[0], 0.01, epsilon = 1e-12);
        assert_relative_eq!(daily[1], -0.02, epsilon = 1e-12);
        assert_relative_eq!(daily[2], 0.03, epsilon = 1e-12);

        let annual = annualized_return(&daily, 252).unwrap();
        assert_relative_eq!(annual, (0.01 - 0.02 + 0.03) / 3.0 * 252.0, epsilon = 1e-12);
    }
}
