//! Coinbase Exchange price client

use crate::{
    client::{check_status, default_http_client, require_positive, ExchangeClient},
    constants::COINBASE_API_URL,
    error::FetchError,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProductTicker {
    price: String,
}

/// Coinbase Exchange spot price client.
///
/// Not every tracked asset is listed here: BNB has no Coinbase product,
/// so it fails fast as unsupported without an HTTP round trip.
pub struct CoinbaseClient {
    client: Client,
}

impl CoinbaseClient {
    /// Creates a new Coinbase client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    fn ticker_url(&self, pair: &str) -> String {
        format!("{COINBASE_API_URL}/products/{pair}/ticker")
    }
}

#[async_trait]
impl ExchangeClient for CoinbaseClient {
    async fn fetch_price(&self, asset: Asset) -> Result<PriceQuote, FetchError> {
        let pair = asset
            .coinbase_pair()
            .ok_or_else(|| FetchError::UnsupportedAsset(asset.symbol().to_string()))?;

        let url = self.ticker_url(pair);
        tracing::debug!(%url, "Fetching price from Coinbase");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let ticker: ProductTicker = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse Coinbase ticker: {e}"))
        })?;

        let price = ticker.price.parse::<f64>().map_err(|_| {
            FetchError::Parse(format!(
                "Coinbase price is not numeric: '{}'",
                ticker.price
            ))
        })?;
        let price = require_positive(price)?;

        Ok(PriceQuote::new(asset, price, self.source_name()))
    }

    fn source_name(&self) -> &'static str {
        "coinbase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bnb_is_unsupported_without_a_network_call() {
        let client = CoinbaseClient::new().unwrap();
        let err = client.fetch_price(Asset::BNB).await.unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedAsset(sym) if sym == "BNB"));
    }

    #[test]
    fn pol_maps_to_matic_product() {
        let client = CoinbaseClient::new().unwrap();
        assert_eq!(
            client.ticker_url(Asset::POL.coinbase_pair().unwrap()),
            "https://api.exchange.coinbase.com/products/MATIC-USD/ticker"
        );
    }
}
