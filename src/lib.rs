//! Front-month continuous futures series from daily Databento files.
//!
//! [`contract_mgmt`] computes the expiration schedule and resolves the
//! front-month contract for a trade date. [`market_data`] decodes DBN files
//! into [`market_data::TradeRecord`]s. [`series`] ties the two together:
//! each daily file contributes the front month's executions, and the days are
//! concatenated into one Parquet file.

pub mod config;
pub mod contract_mgmt;
pub mod core;
pub mod market_data;
pub mod series;

pub use config::SeriesConfig;
pub use core::{FrontMonthError, Result};
pub use series::{RunSummary, SeriesBuilder};
