use crate::core::error::{RatesError, Result};
use crate::core::source::RateSource;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Fetches snapshots from the Open Exchange Rates HTTP API.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oxrates/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpSource { client })
    }
}

/// Strips the `app_id` credential so URLs can be logged and reported.
pub fn redact(url: &str) -> String {
    match url.split_once("app_id=") {
        Some((head, tail)) => {
            let rest = tail.find('&').map_or("", |i| &tail[i..]);
            format!("{head}app_id=***{rest}")
        }
        None => url.to_string(),
    }
}

#[async_trait]
impl RateSource for HttpSource {
    #[instrument(name = "RatesFetch", skip_all, fields(url = %redact(url)))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Requesting rates");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RatesError::HttpStatus {
                status: response.status(),
                endpoint: redact(url),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Received rates response");
        Ok(body.to_vec())
    }
}
