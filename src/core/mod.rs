//! Core rate lookup logic: engine, caches, snapshots and errors

pub mod cache;
pub mod config;
pub mod error;
pub mod log;
pub mod rates;
pub mod response;
pub mod source;

// Re-export main types for cleaner imports
pub use cache::{CacheClient, CacheConfig, KeyOptions, MemoryCache, RateCache};
pub use error::{RatesError, Result};
pub use rates::{Conversion, DateInput, Quote, RateQuery, Rates, cross_rate, round};
pub use response::{Response, Snapshot};
pub use source::RateSource;
