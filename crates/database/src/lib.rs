//! # ETF Analyzer Database Crate
//!
//! This crate is the Query Stage: a high-level, read-mostly interface to the
//! SQLite store that holds one table per asset symbol.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the workspace sees
//!   `AssetSeries`, `FieldObservation` and `PortfolioSeries`, never rows.
//! - **Explicit handle:** `DbRepository` owns the pool it is given. There is no
//!   process-wide connection; callers close the repository when the run ends.
//! - **Explicit ordering:** every statement states its `ORDER BY`.
//! - **Checked identifiers:** table names come from validated `Symbol`s and
//!   column names from the closed `NumericField` enum, both emitted quoted.
//!
//! ## Public API
//!
//! - `connect` / `connect_writable`: open an SQLite connection pool.
//! - `DbRepository`: `fetch_all`, `fetch_filtered`, `fetch_top_n`,
//!   `fetch_joined`, `list_tables`, `save_records`.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod sql;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_writable};
pub use error::DbError;
pub use repository::DbRepository;
