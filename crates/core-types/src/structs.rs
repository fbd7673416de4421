use crate::error::CoreError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_SYMBOL_LEN: usize = 32;

/// A ticker symbol, which is also the name of the asset's table in the store.
///
/// Construction validates the text so that it can be safely interpolated into
/// SQL as a quoted identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SYMBOL_LEN
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !raw.starts_with(|c: char| c.is_ascii_digit());
        if valid {
            Ok(Self(raw))
        } else {
            Err(CoreError::InvalidSymbol(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The symbol as a double-quoted SQL identifier, e.g. `"PYPL"`.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::new(s.trim())
    }
}

impl TryFrom<String> for Symbol {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// One trading day of an asset table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// `close_t / close_{t-1} - 1`, precomputed by the store.
    pub daily_return: f64,
}

/// A `(time, value)` pair produced by a projected scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldObservation {
    pub time: NaiveDateTime,
    pub value: f64,
}

/// A read-only snapshot of one asset's table, ordered by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSeries {
    symbol: Symbol,
    records: Vec<AssetRecord>,
}

impl AssetSeries {
    /// Builds a series, rejecting records whose timestamps are not strictly
    /// increasing.
    pub fn new(symbol: Symbol, records: Vec<AssetRecord>) -> Result<Self, CoreError> {
        if !strictly_increasing(records.iter().map(|r| r.time)) {
            return Err(CoreError::UnorderedSeries(symbol.to_string()));
        }
        Ok(Self { symbol, records })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn times(&self) -> Vec<NaiveDateTime> {
        self.records.iter().map(|r| r.time).collect()
    }

    pub fn daily_returns(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.daily_return).collect()
    }

    /// The first `n` records (fewer if the series is shorter).
    pub fn head(&self, n: usize) -> &[AssetRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// The last `n` records (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> &[AssetRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn first_time(&self) -> Option<NaiveDateTime> {
        self.records.first().map(|r| r.time)
    }

    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.time)
    }
}

/// The inner equi-join of several asset series on `time`: one row per
/// timestamp present in every constituent, one daily-return column per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSeries {
    symbols: Vec<Symbol>,
    times: Vec<NaiveDateTime>,
    returns: Vec<Vec<f64>>,
}

impl PortfolioSeries {
    pub fn new(
        symbols: Vec<Symbol>,
        times: Vec<NaiveDateTime>,
        returns: Vec<Vec<f64>>,
    ) -> Result<Self, CoreError> {
        if times.len() != returns.len() {
            return Err(CoreError::RaggedRow {
                row: times.len().min(returns.len()),
                expected: symbols.len(),
                found: 0,
            });
        }
        if let Some((row, found)) = returns
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != symbols.len())
            .map(|(i, row)| (i, row.len()))
        {
            return Err(CoreError::RaggedRow {
                row,
                expected: symbols.len(),
                found,
            });
        }
        if !strictly_increasing(times.iter().copied()) {
            let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
            return Err(CoreError::UnorderedSeries(names.join("+")));
        }
        Ok(Self {
            symbols,
            times,
            returns,
        })
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Rows of daily returns, in `symbols()` column order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.returns
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The daily returns of the `index`-th constituent.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.symbols.len() {
            return None;
        }
        Some(self.returns.iter().map(|row| row[index]).collect())
    }

    pub fn column_by_symbol(&self, symbol: &Symbol) -> Option<Vec<f64>> {
        let index = self.symbols.iter().position(|s| s == symbol)?;
        self.column(index)
    }

    /// Turns a join with no common timestamps into `CoreError::EmptyResult`.
    pub fn require_rows(self) -> Result<Self, CoreError> {
        if self.is_empty() {
            let names: Vec<&str> = self.symbols.iter().map(Symbol::as_str).collect();
            return Err(CoreError::EmptyResult(format!(
                "no common timestamps across {}",
                names.join(", ")
            )));
        }
        Ok(self)
    }
}

fn strictly_increasing(mut times: impl Iterator<Item = NaiveDateTime>) -> bool {
    let Some(mut previous) = times.next() else {
        return true;
    };
    for time in times {
        if time <= previous {
            return false;
        }
        previous = time;
    }
    true
}
