//! Decoded rate snapshots and the read-only view handed to callers.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A rate table anchored to `base`, as sent by the upstream API.
///
/// `base` and `rates` default to empty so that a payload with an unexpected
/// shape still decodes; the problem surfaces when a currency is looked up.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// Decodes a raw JSON payload into a snapshot.
pub fn decode(raw: &[u8]) -> Result<Snapshot> {
    Ok(serde_json::from_slice(raw)?)
}

#[derive(Debug, Clone)]
pub struct Response {
    snapshot: Arc<Snapshot>,
}

impl Response {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self { snapshot }
    }

    pub fn base_currency(&self) -> &str {
        &self.snapshot.base
    }

    pub fn base(&self) -> &str {
        self.base_currency()
    }

    pub fn rates(&self) -> &HashMap<String, f64> {
        &self.snapshot.rates
    }

    /// Rate of `currency` against the base currency.
    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.snapshot
            .rates
            .get(&currency.to_ascii_uppercase())
            .copied()
    }

    /// Upstream publication time as a unix timestamp, when present.
    pub fn timestamp(&self) -> Option<i64> {
        self.snapshot.timestamp
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl From<Snapshot> for Response {
    fn from(snapshot: Snapshot) -> Self {
        Self::new(Arc::new(snapshot))
    }
}
