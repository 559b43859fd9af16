//! The rates engine.
//!
//! Resolves latest or historical snapshots (the latest one memoized in
//! memory, historical ones through the configured [`RateCache`]) and derives
//! any-to-any exchange rates from a single base-anchored rate table.

use crate::core::cache::{CacheConfig, KeyOptions, RateCache};
use crate::core::config::AppConfig;
use crate::core::error::{RatesError, Result};
use crate::core::response::{Response, Snapshot, decode};
use crate::core::source::RateSource;
use crate::providers::open_exchange_rates::HttpSource;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}|\d{6})$").expect("date pattern is valid"));

/// A date for historical lookups, either structured or as `yyyy-mm-dd` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
}

impl DateInput {
    /// The date token used in the cache key and the historical endpoint.
    pub fn to_date_string(&self) -> Result<String> {
        match self {
            DateInput::Date(date) => Ok(date.format("%Y-%m-%d").to_string()),
            DateInput::Text(text) if DATE_PATTERN.is_match(text) => Ok(text.clone()),
            DateInput::Text(text) => Err(RatesError::InvalidDateFormat(text.clone())),
        }
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Text(text)
    }
}

/// Parameters of an exchange rate or conversion request. Missing or empty
/// currencies fall back to the snapshot's base currency.
#[derive(Debug, Clone, Default)]
pub struct RateQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub on: Option<DateInput>,
}

impl RateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, currency: &str) -> Self {
        self.from = Some(currency.to_string());
        self
    }

    pub fn to(mut self, currency: &str) -> Self {
        self.to = Some(currency.to_string());
        self
    }

    pub fn on(mut self, date: impl Into<DateInput>) -> Self {
        self.on = Some(date.into());
        self
    }
}

/// Rounds half away from zero at `decimals` places.
///
/// Rounding happens on the scaled value so results match
/// `(amount * 10^decimals).round() / 10^decimals` bit for bit.
pub fn round(amount: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (amount * factor).round() / factor
}

fn resolve_currency(code: Option<&str>, base: &str) -> String {
    match code.map(str::to_ascii_uppercase) {
        Some(code) if !code.is_empty() => code,
        _ => base.to_string(),
    }
}

/// A derived exchange rate between two resolved currency codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub from: String,
    pub to: String,
    /// Units of `to` per unit of `from`, rounded to 6 places.
    pub rate: f64,
}

/// A converted amount together with the quote it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub quote: Quote,
    pub amount: f64,
    /// `amount * quote.rate`, rounded to 2 places.
    pub value: f64,
}

/// Exchange rate between two currencies of `response`.
pub fn cross_rate(response: &Response, from: Option<&str>, to: Option<&str>) -> Result<Quote> {
    let base = response.base_currency();
    let from = resolve_currency(from, base);
    let to = resolve_currency(to, base);

    let rates = response.rates();
    let (from_rate, to_rate) = match (rates.get(&from), rates.get(&to)) {
        (Some(from_rate), Some(to_rate)) => (*from_rate, *to_rate),
        _ => return Err(RatesError::RateNotFound { from, to }),
    };

    let rate = if from == to {
        1.0
    } else if from == base {
        to_rate
    } else if to == base {
        1.0 / from_rate
    } else {
        // Multiplying by the reciprocal can differ from a plain division in the last bit.
        to_rate * (1.0 / from_rate)
    };
    Ok(Quote {
        from,
        to,
        rate: round(rate, 6),
    })
}

pub struct Rates {
    app_id: String,
    base_url: String,
    cache: RateCache,
    source: Arc<dyn RateSource>,
    require_source_currency: bool,
    latest: Mutex<Option<Arc<Snapshot>>>,
}

impl Rates {
    /// Creates an engine using the cache settings from `config`. An explicit
    /// `app_id` wins over the one in `config`.
    pub fn new(app_id: Option<&str>, config: &AppConfig) -> Result<Self> {
        Self::with_cache(app_id, config, CacheConfig::from(&config.cache))
    }

    /// Creates an engine fetching from the Open Exchange Rates HTTP API.
    pub fn with_cache(
        app_id: Option<&str>,
        config: &AppConfig,
        cache: CacheConfig,
    ) -> Result<Self> {
        Self::with_source(app_id, config, cache, Arc::new(HttpSource::new()?))
    }

    /// Creates an engine fetching from `source`.
    pub fn with_source(
        app_id: Option<&str>,
        config: &AppConfig,
        cache: CacheConfig,
        source: Arc<dyn RateSource>,
    ) -> Result<Self> {
        let app_id = app_id
            .filter(|id| !id.is_empty())
            .or_else(|| config.app_id.as_deref().filter(|id| !id.is_empty()))
            .ok_or(RatesError::MissingAppId)?
            .to_string();
        let cache = cache.resolve()?;
        debug!(cache = ?cache, base_url = %config.base_url, "Creating rates engine");

        Ok(Self {
            app_id,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
            source,
            require_source_currency: config.require_source_currency,
            latest: Mutex::new(None),
        })
    }

    /// Latest rates, fetched once and memoized until `force_reload` is set.
    #[instrument(name = "LatestRates", skip(self))]
    pub async fn latest(&self, force_reload: bool) -> Result<Response> {
        let mut slot = self.latest.lock().await;
        if let (false, Some(snapshot)) = (force_reload, slot.as_ref()) {
            debug!("Using memoized latest rates");
            return Ok(Response::new(Arc::clone(snapshot)));
        }

        let url = format!("{}/latest.json?app_id={}", self.base_url, self.app_id);
        let raw = self.source.fetch(&url).await?;
        let snapshot = Arc::new(decode(&raw)?);
        *slot = Some(Arc::clone(&snapshot));
        Ok(Response::new(snapshot))
    }

    /// Historical rates for `date`. The raw payload is cached under the date
    /// key and decoded on every call.
    #[instrument(name = "HistoricalRates", skip_all)]
    pub async fn on(&self, date: impl Into<DateInput>) -> Result<Response> {
        let date = date.into().to_date_string()?;
        let key = self.cache.build_key(&KeyOptions {
            on: Some(&date),
            from: None,
        });

        let raw = match self.cache.get(&key).await? {
            Some(raw) => raw,
            None => {
                let url = format!(
                    "{}/historical/{}.json?app_id={}",
                    self.base_url, date, self.app_id
                );
                let raw = self.source.fetch(&url).await?;
                self.cache.set(&key, raw).await?
            }
        };
        Ok(Response::from(decode(&raw)?))
    }

    /// Resolves the snapshot for `query` and derives the quote from it.
    pub async fn quote(&self, query: &RateQuery) -> Result<Quote> {
        let response = match &query.on {
            Some(date) => self.on(date.clone()).await?,
            None => self.latest(false).await?,
        };
        cross_rate(&response, query.from.as_deref(), query.to.as_deref())
    }

    pub async fn exchange_rate(&self, query: &RateQuery) -> Result<f64> {
        Ok(self.quote(query).await?.rate)
    }

    pub async fn conversion(&self, amount: f64, query: &RateQuery) -> Result<Conversion> {
        if self.require_source_currency && query.from.as_deref().is_none_or(str::is_empty) {
            return Err(RatesError::MissingSourceCurrency);
        }
        let quote = self.quote(query).await?;
        let value = round(amount * quote.rate, 2);
        Ok(Conversion {
            quote,
            amount,
            value,
        })
    }

    /// Converts `amount` using [`Rates::exchange_rate`], rounded to 2 places.
    pub async fn convert(&self, amount: f64, query: &RateQuery) -> Result<f64> {
        Ok(self.conversion(amount, query).await?.value)
    }
}
