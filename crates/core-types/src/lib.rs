//! # ETF Analyzer Core Types
//!
//! Layer 0 of the workspace: the value types shared by the query, aggregation
//! and presentation crates. Nothing in here performs I/O.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::NumericField;
pub use error::CoreError;
pub use structs::{AssetRecord, AssetSeries, FieldObservation, PortfolioSeries, Symbol};
