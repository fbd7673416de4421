use crate::error::DbError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Opens a read-only connection pool to the SQLite store at `url`.
///
/// The analysis never writes, so the store is opened read-only and a missing
/// file is an error rather than silently creating an empty database.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, DbError> {
    let options = parse_options(url)?.read_only(true);
    open_pool(options, max_connections).await
}

/// Opens a writable pool, creating the database file if needed. Used for
/// importing records.
pub async fn connect_writable(url: &str, max_connections: u32) -> Result<SqlitePool, DbError> {
    let options = parse_options(url)?.create_if_missing(true);
    open_pool(options, max_connections).await
}

fn parse_options(url: &str) -> Result<SqliteConnectOptions, DbError> {
    if !url.starts_with("sqlite:") {
        return Err(DbError::ConnectionConfigError(format!(
            "{url}: expected an sqlite: URL"
        )));
    }
    SqliteConnectOptions::from_str(url)
        .map_err(|e| DbError::ConnectionConfigError(format!("{url}: {e}")))
}

async fn open_pool(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> Result<SqlitePool, DbError> {
    if max_connections == 0 {
        return Err(DbError::ConnectionConfigError(
            "max_connections must be at least 1".to_string(),
        ));
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::debug!(max_connections, "Opened SQLite connection pool.");
    Ok(pool)
}
