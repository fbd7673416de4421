use core_types::{CoreError, Symbol};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("No table exists for symbol '{0}'.")]
    NotFound(Symbol),

    #[error("Table '{symbol}' has no '{column}' column.")]
    SchemaMismatch { symbol: Symbol, column: String },

    #[error("Table '{symbol}' contains NULL in column '{column}'.")]
    NullValue { symbol: Symbol, column: String },

    #[error("Table '{symbol}' has an unreadable timestamp '{value}'.")]
    InvalidTimestamp { symbol: Symbol, value: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}
