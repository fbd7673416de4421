use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The numeric columns of an asset table that may be projected, filtered or
/// ordered on.
///
/// Being a closed enum, it is also the only way a column name reaches the SQL
/// text, so user input never lands in a query unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Open,
    High,
    Low,
    Close,
    DailyReturns,
}

impl NumericField {
    pub const ALL: [NumericField; 5] = [
        NumericField::Open,
        NumericField::High,
        NumericField::Low,
        NumericField::Close,
        NumericField::DailyReturns,
    ];

    /// Returns the column name as stored in the asset tables.
    pub fn column(&self) -> &'static str {
        match self {
            NumericField::Open => "open",
            NumericField::High => "high",
            NumericField::Low => "low",
            NumericField::Close => "close",
            NumericField::DailyReturns => "daily_returns",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for NumericField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        NumericField::ALL
            .into_iter()
            .find(|field| field.column() == wanted)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}
