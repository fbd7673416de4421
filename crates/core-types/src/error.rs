use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid symbol '{0}': expected 1-32 ASCII letters, digits or '_', not starting with a digit")]
    InvalidSymbol(String),

    #[error("Unknown numeric field '{0}'")]
    UnknownField(String),

    #[error("Timestamps in series '{0}' are not strictly increasing")]
    UnorderedSeries(String),

    #[error("Row {row} has {found} return columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("The query was valid but returned no rows: {0}")]
    EmptyResult(String),
}
