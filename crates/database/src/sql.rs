//! Statement text for the asset tables.
//!
//! Identifiers cannot be bound as parameters, so table names come from
//! `Symbol::quoted` and column names from `NumericField::column`. Values are
//! always bound.

use core_types::{NumericField, Symbol};

/// Columns every asset table must have for a full scan.
pub const ASSET_COLUMNS: [&str; 6] = ["time", "open", "high", "low", "close", "daily_returns"];

pub const TIME_COLUMN: &str = "time";

pub const LIST_TABLES: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY name ASC";

/// SQLite resolves table names case-insensitively, so the lookup does too.
pub const TABLE_EXISTS: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE";

pub const TABLE_COLUMNS: &str = "SELECT name FROM pragma_table_info(?1)";

/// `SELECT * FROM <symbol>` with the columns spelled out and the order explicit.
pub fn select_all(symbol: &Symbol) -> String {
    format!(
        "SELECT time, CAST(open AS REAL) AS open, CAST(high AS REAL) AS high, \
         CAST(low AS REAL) AS low, CAST(close AS REAL) AS close, \
         CAST(daily_returns AS REAL) AS daily_returns \
         FROM {} ORDER BY time ASC",
        symbol.quoted()
    )
}

/// Projects `(time, field)` for rows where `field > ?1`.
pub fn select_filtered(symbol: &Symbol, field: NumericField) -> String {
    format!(
        "SELECT time, CAST({col} AS REAL) AS value FROM {table} \
         WHERE {col} > ?1 ORDER BY time ASC",
        col = field.column(),
        table = symbol.quoted()
    )
}

/// Projects `(time, field)` sorted by `field` descending, ties by time
/// ascending, limited to `?1` rows.
pub fn select_top_n(symbol: &Symbol, field: NumericField) -> String {
    format!(
        "SELECT time, CAST({col} AS REAL) AS value FROM {table} \
         ORDER BY {col} DESC, time ASC LIMIT ?1",
        col = field.column(),
        table = symbol.quoted()
    )
}

/// Inner-joins every symbol's table on `time`, projecting one `daily_returns`
/// column per symbol as `r0`, `r1`, ...
///
/// Tables are aliased positionally, so a symbol may appear more than once.
pub fn select_joined(symbols: &[Symbol]) -> Option<String> {
    let (first, rest) = symbols.split_first()?;

    let projection: Vec<String> = (0..symbols.len())
        .map(|i| format!("CAST(t{i}.daily_returns AS REAL) AS r{i}"))
        .collect();

    let mut sql = format!(
        "SELECT t0.time AS time, {} FROM {} AS t0",
        projection.join(", "),
        first.quoted()
    );
    for (i, symbol) in rest.iter().enumerate() {
        let alias = format!("t{}", i + 1);
        sql.push_str(&format!(
            " INNER JOIN {} AS {alias} ON t0.time = {alias}.time",
            symbol.quoted()
        ));
    }
    sql.push_str(" ORDER BY t0.time ASC");
    Some(sql)
}

/// DDL used when importing records into a table that does not exist yet.
pub fn create_asset_table(symbol: &Symbol) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         time TEXT NOT NULL PRIMARY KEY, \
         open REAL NOT NULL, \
         high REAL NOT NULL, \
         low REAL NOT NULL, \
         close REAL NOT NULL, \
         daily_returns REAL NOT NULL)",
        symbol.quoted()
    )
}

/// Idempotent insert: rows whose `time` already exists are skipped.
pub fn insert_record(symbol: &Symbol) -> String {
    format!(
        "INSERT OR IGNORE INTO {} (time, open, high, low, close, daily_returns) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        symbol.quoted()
    )
}
