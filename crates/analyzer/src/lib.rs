use crate::error::AnalyzerError;
use analytics::{AnalyticsEngine, AssetReport, PortfolioReport};
use core_types::{AssetSeries, FieldObservation, NumericField, PortfolioSeries, Symbol};
use database::DbRepository;

pub mod charts;
pub mod error;

pub use charts::{ChartFrame, NamedSeries};

/// A single asset's table together with its return statistics.
#[derive(Debug, Clone)]
pub struct AssetAnalysis {
    pub series: AssetSeries,
    pub report: AssetReport,
}

impl AssetAnalysis {
    /// Daily and cumulative return charts, in that order.
    pub fn charts(&self) -> Vec<ChartFrame> {
        vec![
            charts::daily_returns(&self.report),
            charts::cumulative_returns(&self.report),
        ]
    }
}

/// The joined portfolio table together with its return statistics.
#[derive(Debug, Clone)]
pub struct PortfolioAnalysis {
    pub portfolio: PortfolioSeries,
    pub report: PortfolioReport,
}

impl PortfolioAnalysis {
    pub fn charts(&self) -> Vec<ChartFrame> {
        vec![charts::portfolio_cumulative_returns(&self.report)]
    }
}

/// Runs the query stage against a repository and feeds the results to the
/// analytics engine.
pub struct Analyzer {
    repo: DbRepository,
    engine: AnalyticsEngine,
}

impl Analyzer {
    pub fn new(repo: DbRepository, engine: AnalyticsEngine) -> Self {
        Self { repo, engine }
    }

    pub fn repository(&self) -> &DbRepository {
        &self.repo
    }

    /// Gives the repository back so the caller can close it.
    pub fn into_repository(self) -> DbRepository {
        self.repo
    }

    pub async fn tables(&self) -> Result<Vec<Symbol>, AnalyzerError> {
        Ok(self.repo.list_tables().await?)
    }

    /// Fetches one asset's full table and computes its statistics.
    pub async fn asset(&self, symbol: &Symbol) -> Result<AssetAnalysis, AnalyzerError> {
        let series = self.repo.fetch_all(symbol).await?;
        let report = self.engine.analyze_asset(&series)?;

        tracing::info!(
            %symbol,
            rows = series.len(),
            annualized_return = report.annualized_return,
            "Asset analysis complete."
        );
        Ok(AssetAnalysis { series, report })
    }

    pub async fn rows_above(
        &self,
        symbol: &Symbol,
        field: NumericField,
        threshold: f64,
    ) -> Result<Vec<FieldObservation>, AnalyzerError> {
        Ok(self.repo.fetch_filtered(symbol, field, threshold).await?)
    }

    pub async fn top_rows(
        &self,
        symbol: &Symbol,
        n: u32,
        field: NumericField,
    ) -> Result<Vec<FieldObservation>, AnalyzerError> {
        Ok(self.repo.fetch_top_n(symbol, n, field).await?)
    }

    /// Joins the assets on time and computes the equally weighted portfolio.
    ///
    /// A join without common timestamps surfaces as `CoreError::EmptyResult`.
    pub async fn portfolio(&self, symbols: &[Symbol]) -> Result<PortfolioAnalysis, AnalyzerError> {
        let portfolio = self.repo.fetch_joined(symbols).await?.require_rows()?;
        let report = self.engine.analyze_portfolio(&portfolio)?;

        tracing::info!(
            constituents = symbols.len(),
            rows = portfolio.len(),
            annualized_return = report.annualized_return,
            final_cumulative_return = report.final_cumulative_return,
            "Portfolio analysis complete."
        );
        Ok(PortfolioAnalysis { portfolio, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};
    use core_types::{AssetRecord, CoreError};
    use database::{connect_writable, DbError};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 4, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    async fn empty_analyzer() -> Analyzer {
        let pool = connect_writable("sqlite::memory:", 1).await.unwrap();
        Analyzer::new(DbRepository::new(pool), AnalyticsEngine::default())
    }

    async fn seed(analyzer: &Analyzer, name: &str, rows: &[(u32, f64)]) {
        let records: Vec<AssetRecord> = rows
            .iter()
            .map(|(d, r)| AssetRecord {
                time: day(*d),
                open: 100.0,
                high: 110.0,
                low: 90.0,
                close: 100.0 * (1.0 + r),
                daily_return: *r,
            })
            .collect();
        analyzer
            .repository()
            .save_records(&sym(name), &records)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn end_to_end_equal_assets() {
        let analyzer = empty_analyzer().await;
        for name in ["GDOT", "GS", "PYPL", "SQ"] {
            seed(&analyzer, name, &[(1, 0.01), (2, -0.02), (3, 0.03)]).await;
        }

        let symbols = [sym("GDOT"), sym("GS"), sym("PYPL"), sym("SQ")];
        let analysis = analyzer.portfolio(&symbols).await.unwrap();
        let report = &analysis.report;

        for (got, want) in report.daily_returns.iter().zip([0.01, -0.02, 0.03]) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        for (got, want) in report.cumulative_returns.iter().zip([1.01, 0.9898, 1.019494]) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert_relative_eq!(
            report.annualized_return,
            (0.01 - 0.02 + 0.03) / 3.0 * 252.0,
            epsilon = 1e-12
        );
        assert_eq!(analysis.charts()[0].series.len(), 5);
    }

    #[tokio::test]
    async fn asset_analysis_and_charts() {
        let analyzer = empty_analyzer().await;
        seed(&analyzer, "PYPL", &[(1, 0.02), (2, 0.01)]).await;

        let analysis = analyzer.asset(&sym("PYPL")).await.unwrap();
        assert_eq!(analysis.series.len(), 2);
        assert_relative_eq!(analysis.report.final_cumulative_return, 1.02 * 1.01, epsilon = 1e-12);

        let charts = analysis.charts();
        assert_eq!(charts[0].title, "PYPL Daily Returns");
        assert_eq!(charts[1].title, "PYPL Cumulative Returns");
        assert!(charts.iter().all(|c| c.validate().is_ok()));
    }

    #[tokio::test]
    async fn empty_asset_table_is_an_analytics_error() {
        let analyzer = empty_analyzer().await;
        seed(&analyzer, "SQ", &[]).await;

        let err = analyzer.asset(&sym("SQ")).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Analytics(_)));
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let analyzer = empty_analyzer().await;

        let err = analyzer.asset(&sym("GS")).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Database(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn disjoint_portfolio_is_empty_result() {
        let analyzer = empty_analyzer().await;
        seed(&analyzer, "A", &[(1, 0.01)]).await;
        seed(&analyzer, "B", &[(2, 0.02)]).await;

        let err = analyzer.portfolio(&[sym("A"), sym("B")]).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Core(CoreError::EmptyResult(_))));
    }

    #[tokio::test]
    async fn query_wrappers_delegate_to_repository() {
        let analyzer = empty_analyzer().await;
        seed(&analyzer, "PYPL", &[(1, 1.5), (2, 1.0), (3, 0.5)]).await;

        let above = analyzer
            .rows_above(&sym("PYPL"), NumericField::Close, 200.0)
            .await
            .unwrap();
        // close = 100 * (1 + r): 250, 200, 150.
        assert_eq!(above.len(), 1);
        assert_eq!(above[0].time, day(1));

        let top = analyzer
            .top_rows(&sym("PYPL"), 2, NumericField::DailyReturns)
            .await
            .unwrap();
        assert_eq!(top.iter().map(|o| o.value).collect::<Vec<_>>(), vec![1.5, 1.0]);

        assert_eq!(analyzer.tables().await.unwrap(), vec![sym("PYPL")]);
    }
}
