//! # ETF Analytics Engine
//!
//! Pure return arithmetic over in-memory series: cumulative compounded
//! return, simple annualization and the equally weighted portfolio return.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of the
//!   store or of the presentation layer. It depends only on `core-types`.
//! - **Stateless Calculation:** `AnalyticsEngine` holds nothing but its
//!   trading-day convention. Series go in, reports come out.
//! - **No silent NaN:** averaging zero values is an `AnalyticsError::EmptyInput`.
//!
//! ## Public API
//!
//! - `returns`: the free functions (`mean`, `cumulative_return`, `annualize`,
//!   `annualized_return`, `portfolio_mean_return`).
//! - `AnalyticsEngine`: builds `AssetReport` and `PortfolioReport`.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod returns;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{AssetReport, ConstituentReport, PortfolioReport};
pub use returns::{
    annualize, annualized_return, cumulative_return, mean, portfolio_mean_return,
    TRADING_DAYS_PER_YEAR,
};
