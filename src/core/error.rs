//! Error types for rate lookups

use thiserror::Error;

/// Errors returned by the rates engine, its caches and the upstream source.
#[derive(Debug, Error)]
pub enum RatesError {
    /// No application identifier was passed in or found in the configuration.
    #[error(
        "Missing App ID. Get one at https://openexchangerates.org/signup and add it to the configuration as `app_id`"
    )]
    MissingAppId,

    /// The configured cache type does not name a known adapter.
    #[error("Missing cache adapter: {0}")]
    MissingCacheAdapter(String),

    /// A cache adapter was selected without the options it needs.
    #[error("Missing required option(s): {}", .0.join(", "))]
    MissingRequiredOption(Vec<String>),

    #[error("Invalid date format: {0:?} (expected yyyy-mm-dd)")]
    InvalidDateFormat(String),

    /// One of the currencies is absent from the snapshot's rate table.
    #[error("Rate not found for {from} -> {to}")]
    RateNotFound { from: String, to: String },

    /// `convert` was called without `from` while the source currency is required.
    #[error("Missing source currency for conversion")]
    MissingSourceCurrency,

    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error: {status} for {endpoint}")]
    HttpStatus {
        status: reqwest::StatusCode,
        endpoint: String,
    },

    #[error("Failed to decode rates payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Cache backend error: {0}")]
    Cache(#[source] anyhow::Error),
}

impl RatesError {
    /// True for errors that make an engine unusable until its configuration is fixed.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RatesError::MissingAppId
                | RatesError::MissingCacheAdapter(_)
                | RatesError::MissingRequiredOption(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RatesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RatesError::MissingRequiredOption(vec!["client".to_string()]);
        assert_eq!(err.to_string(), "Missing required option(s): client");

        let err = RatesError::RateNotFound {
            from: "USD".to_string(),
            to: "???".to_string(),
        };
        assert_eq!(err.to_string(), "Rate not found for USD -> ???");

        let err = RatesError::MissingCacheAdapter("redis".to_string());
        assert_eq!(err.to_string(), "Missing cache adapter: redis");
    }

    #[test]
    fn test_configuration_kinds() {
        assert!(RatesError::MissingAppId.is_configuration());
        assert!(RatesError::MissingCacheAdapter("x".into()).is_configuration());
        assert!(!RatesError::InvalidDateFormat("x".into()).is_configuration());
        assert!(!RatesError::MissingSourceCurrency.is_configuration());
    }
}
