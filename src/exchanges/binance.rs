//! Binance price client

use crate::{
    client::{check_status, default_http_client, require_positive, ExchangeClient},
    constants::{BINANCE_API_URL, BINANCE_TICKER_ENDPOINT},
    error::FetchError,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Binance ticker response; the price arrives as a decimal string
#[derive(Debug, Deserialize)]
struct TickerResponse {
    price: String,
}

/// Binance spot price client
pub struct BinanceClient {
    client: Client,
}

impl BinanceClient {
    /// Creates a new Binance client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    fn ticker_url(&self, asset: Asset) -> String {
        format!(
            "{}{}?symbol={}",
            BINANCE_API_URL,
            BINANCE_TICKER_ENDPOINT,
            asset.binance_pair()
        )
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    async fn fetch_price(&self, asset: Asset) -> Result<PriceQuote, FetchError> {
        let url = self.ticker_url(asset);
        tracing::debug!(%url, "Fetching price from Binance");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let ticker: TickerResponse = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse Binance ticker: {e}"))
        })?;

        let price = ticker.price.parse::<f64>().map_err(|_| {
            FetchError::Parse(format!("Binance price is not numeric: '{}'", ticker.price))
        })?;
        let price = require_positive(price)?;

        Ok(PriceQuote::new(asset, price, self.source_name()))
    }

    fn source_name(&self) -> &'static str {
        "binance"
    }
}
