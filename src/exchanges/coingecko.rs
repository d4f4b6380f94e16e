//! CoinGecko price client

use crate::{
    client::{check_status, default_http_client, ExchangeClient},
    constants::{COINGECKO_API_URL, COINGECKO_SIMPLE_PRICE_ENDPOINT},
    error::FetchError,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

/// CoinGecko simple-price response: a map of coin id to currency prices
#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    #[serde(flatten)]
    prices: HashMap<String, CurrencyPrices>,
}

#[derive(Debug, Deserialize)]
struct CurrencyPrices {
    usd: f64,
}

/// CoinGecko price client.
///
/// The only source with a batch endpoint: one request covers every
/// requested asset, keyed by CoinGecko coin id.
pub struct CoinGeckoClient {
    client: Client,
}

impl CoinGeckoClient {
    /// Creates a new CoinGecko client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    fn simple_price_url(&self, assets: &[Asset]) -> String {
        let ids = assets
            .iter()
            .map(|a| a.coingecko_id())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{COINGECKO_API_URL}{COINGECKO_SIMPLE_PRICE_ENDPOINT}?ids={ids}&vs_currencies=usd"
        )
    }

    fn collect_quotes(
        &self,
        response: SimplePriceResponse,
        assets: &[Asset],
    ) -> HashMap<Asset, PriceQuote> {
        let mut result = HashMap::new();

        for &asset in assets {
            if let Some(entry) = response.prices.get(asset.coingecko_id()) {
                // Skip non-positive values rather than fail the batch
                if entry.usd.is_finite() && entry.usd > 0.0 {
                    result.insert(asset, PriceQuote::new(asset, entry.usd, self.source_name()));
                } else {
                    tracing::warn!(
                        asset = asset.symbol(),
                        price = entry.usd,
                        "CoinGecko returned an invalid price"
                    );
                }
            }
        }

        result
    }
}

#[async_trait]
impl ExchangeClient for CoinGeckoClient {
    async fn fetch_price(&self, asset: Asset) -> Result<PriceQuote, FetchError> {
        let mut prices = self.fetch_prices(&[asset]).await?;
        prices
            .remove(&asset)
            .ok_or_else(|| FetchError::UnsupportedAsset(asset.symbol().to_string()))
    }

    async fn fetch_prices(
        &self,
        assets: &[Asset],
    ) -> Result<HashMap<Asset, PriceQuote>, FetchError> {
        if assets.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.simple_price_url(assets);
        tracing::debug!(%url, "Fetching prices from CoinGecko");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let parsed: SimplePriceResponse = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse CoinGecko response: {e}"))
        })?;

        let prices = self.collect_quotes(parsed, assets);
        if prices.is_empty() {
            return Err(FetchError::Parse(
                "No prices returned from CoinGecko".to_string(),
            ));
        }

        tracing::debug!(count = prices.len(), "Fetched prices from CoinGecko");
        Ok(prices)
    }

    fn source_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_price_url_joins_coin_ids() {
        let client = CoinGeckoClient::new().unwrap();
        let url = client.simple_price_url(&[Asset::BTC, Asset::ETH, Asset::BNB, Asset::POL]);
        assert_eq!(
            url,
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin,ethereum,binancecoin,polygon&vs_currencies=usd"
        );
    }

    #[test]
    fn collect_quotes_skips_non_positive_prices() {
        let client = CoinGeckoClient::new().unwrap();
        let response: SimplePriceResponse = serde_json::from_str(
            r#"{"bitcoin":{"usd":43000.0},"ethereum":{"usd":0.0}}"#,
        )
        .unwrap();

        let quotes = client.collect_quotes(response, &[Asset::BTC, Asset::ETH]);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[&Asset::BTC].price_usd, 43_000.0);
        assert_eq!(quotes[&Asset::BTC].source, "coingecko");
    }
}
