use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Cannot compute {0} over an empty series")]
    EmptyInput(String),

    #[error("The portfolio has no return columns to average")]
    MissingColumns,

    #[error("Calculation produced a non-finite value in metric '{0}'")]
    NonFinite(String),
}
