//! Upstream fetch abstraction

use crate::core::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches `url` and returns the raw body. Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
