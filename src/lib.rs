// src/lib.rs
//
// Loading, cleaning and enrichment for the Bulgarian SEBRA public-spending
// registry: zip/CSV ingestion, two scraped reference lookup tables
// (governments-by-day and bank BIC codes), per-account reports, and a
// chart-spec adapter.

pub mod chart;
pub mod error;
pub mod fetch;
pub mod process;
pub mod report;

pub use error::{Result, SebraError};
pub use process::Transaction;
