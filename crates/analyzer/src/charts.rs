//! Chart-ready tables for the presentation layer.
//!
//! A `ChartFrame` is a time axis plus one or more named numeric series, with
//! the title and axis labels the renderer should use. Rendering happens
//! elsewhere; these frames are only serialized.

use crate::error::AnalyzerError;
use analytics::{AssetReport, PortfolioReport};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Label of the equally weighted line on portfolio charts.
pub const EQUAL_WEIGHTED_LABEL: &str = "Equal Weighted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<NaiveDateTime>,
    pub series: Vec<NamedSeries>,
}

impl ChartFrame {
    /// Every series must have one value per x-axis point.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        match self.series.iter().find(|s| s.values.len() != self.x.len()) {
            Some(bad) => Err(AnalyzerError::ChartShape {
                title: self.title.clone(),
                series: bad.name.clone(),
                expected: self.x.len(),
                found: bad.values.len(),
            }),
            None => Ok(()),
        }
    }

    /// A file-system friendly slug of the title, e.g. `pypl_daily_returns`.
    pub fn slug(&self) -> String {
        self.title
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    }
}

pub fn daily_returns(report: &AssetReport) -> ChartFrame {
    ChartFrame {
        title: format!("{} Daily Returns", report.symbol),
        x_label: "Time".to_string(),
        y_label: "Daily Returns".to_string(),
        x: report.times.clone(),
        series: vec![NamedSeries {
            name: report.symbol.to_string(),
            values: report.daily_returns.clone(),
        }],
    }
}

pub fn cumulative_returns(report: &AssetReport) -> ChartFrame {
    ChartFrame {
        title: format!("{} Cumulative Returns", report.symbol),
        x_label: "Time".to_string(),
        y_label: "Cumulative Returns".to_string(),
        x: report.times.clone(),
        series: vec![NamedSeries {
            name: report.symbol.to_string(),
            values: report.cumulative_returns.clone(),
        }],
    }
}

/// Each constituent's cumulative return followed by the equally weighted line.
pub fn portfolio_cumulative_returns(report: &PortfolioReport) -> ChartFrame {
    let mut series: Vec<NamedSeries> = report
        .constituents
        .iter()
        .map(|c| NamedSeries {
            name: c.symbol.to_string(),
            values: c.cumulative_returns.clone(),
        })
        .collect();
    series.push(NamedSeries {
        name: EQUAL_WEIGHTED_LABEL.to_string(),
        values: report.cumulative_returns.clone(),
    });

    ChartFrame {
        title: "ETF Portfolio Cumulative Returns".to_string(),
        x_label: "Time".to_string(),
        y_label: "Cumulative Return".to_string(),
        x: report.times.clone(),
        series,
    }
}
