//! Client abstraction for fetching spot prices from exchange APIs

use crate::{
    constants::{REQUEST_TIMEOUT_SECS, USER_AGENT},
    error::FetchError,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Trait for spot price sources.
///
/// Implementations fetch cryptocurrency prices from one external API
/// (Binance, KuCoin, Coinbase, CoinGecko). Clients perform no retries
/// of their own; retry and fallback policy belongs to the aggregator.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Fetches the current price for a single asset
    async fn fetch_price(&self, asset: Asset) -> Result<PriceQuote, FetchError>;

    /// Fetches prices for multiple assets.
    ///
    /// The default walks the assets one by one and succeeds if any
    /// price came back; sources with a batch endpoint override this.
    async fn fetch_prices(
        &self,
        assets: &[Asset],
    ) -> Result<HashMap<Asset, PriceQuote>, FetchError> {
        let mut result = HashMap::new();
        let mut last_error = None;

        for &asset in assets {
            match self.fetch_price(asset).await {
                Ok(quote) => {
                    result.insert(asset, quote);
                }
                Err(e) => {
                    tracing::debug!(
                        source = self.source_name(),
                        asset = asset.symbol(),
                        error = %e,
                        "Single-asset fetch failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        if result.is_empty() && !assets.is_empty() {
            Err(last_error.unwrap_or_else(|| {
                FetchError::Parse("no prices returned".to_string())
            }))
        } else {
            Ok(result)
        }
    }

    /// Returns the name of this source
    fn source_name(&self) -> &'static str;
}

/// Builds the HTTP client every source uses: uniform timeout, fixed
/// user agent.
pub(crate) fn default_http_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Network)
}

/// Triage for HTTP responses: 429 maps to RateLimited, other non-2xx
/// to HttpStatus with the response body attached.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(FetchError::RateLimited);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Rejects zero, negative and non-finite prices before they can become
/// quotes.
pub(crate) fn require_positive(price: f64) -> Result<f64, FetchError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(FetchError::Parse(format!("invalid price value: {price}")))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Scripted outcome for one asset on the mock exchange
    #[derive(Debug, Clone)]
    pub enum MockOutcome {
        Price(f64),
        Timeout,
        Http(u16),
        Parse(String),
    }

    /// Mock exchange for aggregator and cache tests
    pub struct MockExchange {
        name: &'static str,
        outcomes: Mutex<HashMap<Asset, MockOutcome>>,
        call_count: Mutex<usize>,
    }

    impl MockExchange {
        pub fn named(name: &'static str) -> Self {
            Self {
                name,
                outcomes: Mutex::new(HashMap::new()),
                call_count: Mutex::new(0),
            }
        }

        pub fn set_price(&self, asset: Asset, price_usd: f64) {
            self.outcomes
                .lock()
                .unwrap()
                .insert(asset, MockOutcome::Price(price_usd));
        }

        pub fn set_outcome(&self, asset: Asset, outcome: MockOutcome) {
            self.outcomes.lock().unwrap().insert(asset, outcome);
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }

        fn outcome_for(&self, asset: Asset) -> Result<PriceQuote, FetchError> {
            match self.outcomes.lock().unwrap().get(&asset) {
                Some(MockOutcome::Price(price)) => {
                    Ok(PriceQuote::new(asset, *price, self.name))
                }
                Some(MockOutcome::Timeout) => Err(FetchError::Timeout),
                Some(MockOutcome::Http(status)) => Err(FetchError::HttpStatus {
                    status: *status,
                    body: String::new(),
                }),
                Some(MockOutcome::Parse(msg)) => Err(FetchError::Parse(msg.clone())),
                None => Err(FetchError::UnsupportedAsset(asset.symbol().to_string())),
            }
        }
    }

    #[async_trait]
    impl ExchangeClient for MockExchange {
        async fn fetch_price(&self, asset: Asset) -> Result<PriceQuote, FetchError> {
            *self.call_count.lock().unwrap() += 1;
            self.outcome_for(asset)
        }

        fn source_name(&self) -> &'static str {
            self.name
        }
    }
}
