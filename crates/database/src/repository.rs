use crate::error::DbError;
use crate::sql;
use chrono::{NaiveDate, NaiveDateTime};
use core_types::{AssetRecord, AssetSeries, FieldObservation, NumericField, PortfolioSeries, Symbol};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the asset store. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

impl DbRepository {
    /// Creates a new `DbRepository` that owns `pool` for the lifetime of a run.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the underlying pool, waiting for open connections to be released.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Lists the asset tables in the store, sorted by name. Tables whose name
    /// is not a valid symbol are skipped.
    pub async fn list_tables(&self) -> Result<Vec<Symbol>, DbError> {
        let names: Vec<String> = sqlx::query_scalar(sql::LIST_TABLES)
            .fetch_all(&self.pool)
            .await?;

        let symbols = names
            .into_iter()
            .filter_map(|name| match Symbol::new(name) {
                Ok(symbol) => Some(symbol),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping table that is not an asset.");
                    None
                }
            })
            .collect();
        Ok(symbols)
    }

    /// Fetches every record of `symbol`'s table, ordered by time ascending.
    pub async fn fetch_all(&self, symbol: &Symbol) -> Result<AssetSeries, DbError> {
        self.require_columns(symbol, &sql::ASSET_COLUMNS).await?;

        let query = sql::select_all(symbol);
        tracing::debug!(%symbol, sql = %query, "Fetching full asset table.");

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(|row| -> Result<AssetRecord, DbError> {
                Ok(AssetRecord {
                    time: get_time(row, symbol)?,
                    open: get_f64(row, symbol, "open")?,
                    high: get_f64(row, symbol, "high")?,
                    low: get_f64(row, symbol, "low")?,
                    close: get_f64(row, symbol, "close")?,
                    daily_return: get_f64(row, symbol, "daily_returns")?,
                })
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        tracing::debug!(%symbol, rows = records.len(), "Fetched asset table.");
        Ok(AssetSeries::new(symbol.clone(), records)?)
    }

    /// Fetches `(time, field)` for the rows where `field > threshold`, ordered
    /// by time ascending. No match yields an empty `Vec`.
    pub async fn fetch_filtered(
        &self,
        symbol: &Symbol,
        field: NumericField,
        threshold: f64,
    ) -> Result<Vec<FieldObservation>, DbError> {
        // SQLite binds NaN as NULL, which would silently match nothing.
        if !threshold.is_finite() {
            return Err(DbError::InvalidQuery(format!(
                "threshold must be a finite number, got {threshold}"
            )));
        }
        self.require_columns(symbol, &[sql::TIME_COLUMN, field.column()])
            .await?;

        let query = sql::select_filtered(symbol, field);
        tracing::debug!(%symbol, %field, threshold, sql = %query, "Fetching filtered rows.");

        let rows = sqlx::query(&query)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;
        let observations = to_observations(&rows, symbol, field)?;

        if observations.is_empty() {
            tracing::warn!(%symbol, %field, threshold, "No rows above threshold.");
        }
        Ok(observations)
    }

    /// Fetches the `n` rows with the largest `field`, sorted descending by
    /// `field` and then ascending by time.
    pub async fn fetch_top_n(
        &self,
        symbol: &Symbol,
        n: u32,
        field: NumericField,
    ) -> Result<Vec<FieldObservation>, DbError> {
        self.require_columns(symbol, &[sql::TIME_COLUMN, field.column()])
            .await?;

        let query = sql::select_top_n(symbol, field);
        tracing::debug!(%symbol, %field, n, sql = %query, "Fetching top rows.");

        let rows = sqlx::query(&query)
            .bind(i64::from(n))
            .fetch_all(&self.pool)
            .await?;
        to_observations(&rows, symbol, field)
    }

    /// Inner-joins the tables of `symbols` on time and returns one
    /// `daily_returns` column per symbol, ordered by time ascending.
    ///
    /// A join without common timestamps is a valid, empty `PortfolioSeries`;
    /// see `PortfolioSeries::require_rows`.
    pub async fn fetch_joined(&self, symbols: &[Symbol]) -> Result<PortfolioSeries, DbError> {
        let query = sql::select_joined(symbols).ok_or_else(|| {
            DbError::InvalidQuery("a join needs at least one symbol".to_string())
        })?;
        for symbol in symbols {
            self.require_columns(symbol, &[sql::TIME_COLUMN, "daily_returns"])
                .await?;
        }

        tracing::debug!(symbols = symbols.len(), sql = %query, "Fetching joined returns.");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut times = Vec::with_capacity(rows.len());
        let mut returns = Vec::with_capacity(rows.len());
        for row in &rows {
            times.push(get_time(row, &symbols[0])?);
            let values = symbols
                .iter()
                .enumerate()
                .map(|(i, symbol)| -> Result<f64, DbError> {
                    let value: Option<f64> = row.try_get(i + 1)?;
                    value.ok_or_else(|| DbError::NullValue {
                        symbol: symbol.clone(),
                        column: "daily_returns".to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, DbError>>()?;
            returns.push(values);
        }

        if times.is_empty() {
            tracing::warn!(symbols = symbols.len(), "Join produced no common timestamps.");
        } else {
            tracing::debug!(rows = times.len(), "Fetched joined returns.");
        }
        Ok(PortfolioSeries::new(symbols.to_vec(), times, returns)?)
    }

    /// Writes `records` into `symbol`'s table inside a single transaction,
    /// creating the table if needed. Existing timestamps are left untouched.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn save_records(
        &self,
        symbol: &Symbol,
        records: &[AssetRecord],
    ) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&sql::create_asset_table(symbol))
            .execute(&mut *tx)
            .await?;

        let insert = sql::insert_record(symbol);
        let mut inserted = 0;
        for record in records {
            let result = sqlx::query(&insert)
                .bind(record.time)
                .bind(record.open)
                .bind(record.high)
                .bind(record.low)
                .bind(record.close)
                .bind(record.daily_return)
                .execute(&mut *tx) // Note: must use the transaction object `tx` here
                .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        tracing::info!(%symbol, inserted, total = records.len(), "Saved asset records.");
        Ok(inserted)
    }

    /// Fails with `NotFound` if the table is missing and `SchemaMismatch` if
    /// any of `columns` is absent from it.
    async fn require_columns(&self, symbol: &Symbol, columns: &[&str]) -> Result<(), DbError> {
        let tables: i64 = sqlx::query_scalar(sql::TABLE_EXISTS)
            .bind(symbol.as_str())
            .fetch_one(&self.pool)
            .await?;
        if tables == 0 {
            return Err(DbError::NotFound(symbol.clone()));
        }

        let present: Vec<String> = sqlx::query_scalar(sql::TABLE_COLUMNS)
            .bind(symbol.as_str())
            .fetch_all(&self.pool)
            .await?;
        if let Some(missing) = columns
            .iter()
            .find(|c| !present.iter().any(|p| p.eq_ignore_ascii_case(c)))
        {
            return Err(DbError::SchemaMismatch {
                symbol: symbol.clone(),
                column: missing.to_string(),
            });
        }
        Ok(())
    }
}

/// Reads the `time` column. Bare `YYYY-MM-DD` dates, which sqlx does not
/// decode as a datetime, are taken as midnight.
fn get_time(row: &SqliteRow, symbol: &Symbol) -> Result<NaiveDateTime, DbError> {
    match row.try_get::<NaiveDateTime, _>(sql::TIME_COLUMN) {
        Ok(time) => Ok(time),
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let raw: String = row.try_get(sql::TIME_COLUMN)?;
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(|| DbError::InvalidTimestamp {
                    symbol: symbol.clone(),
                    value: raw,
                })
        }
        Err(e) => Err(e.into()),
    }
}

fn get_f64(row: &SqliteRow, symbol: &Symbol, column: &str) -> Result<f64, DbError> {
    let value: Option<f64> = row.try_get(column)?;
    value.ok_or_else(|| DbError::NullValue {
        symbol: symbol.clone(),
        column: column.to_string(),
    })
}

fn to_observations(
    rows: &[SqliteRow],
    symbol: &Symbol,
    field: NumericField,
) -> Result<Vec<FieldObservation>, DbError> {
    rows.iter()
        .map(|row| -> Result<FieldObservation, DbError> {
            let value: Option<f64> = row.try_get("value")?;
            Ok(FieldObservation {
                time: get_time(row, symbol)?,
                value: value.ok_or_else(|| DbError::NullValue {
                    symbol: symbol.clone(),
                    column: field.column().to_string(),
                })?,
            })
        })
        .collect()
}
