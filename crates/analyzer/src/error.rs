use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error(transparent)]
    Core(#[from] core_types::CoreError),

    #[error("Chart '{title}' has series '{series}' of length {found}, expected {expected}")]
    ChartShape {
        title: String,
        series: String,
        expected: usize,
        found: usize,
    },
}
