//! KuCoin price client

use crate::{
    client::{check_status, default_http_client, require_positive, ExchangeClient},
    constants::{KUCOIN_API_URL, KUCOIN_LEVEL1_ENDPOINT},
    error::FetchError,
    types::{Asset, PriceQuote},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// KuCoin wraps every payload in an envelope; `code` is "200000" on
/// success even when the HTTP status is 200.
#[derive(Debug, Deserialize)]
struct KuCoinEnvelope {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Level1Data>,
}

#[derive(Debug, Deserialize)]
struct Level1Data {
    price: String,
}

/// KuCoin spot price client
pub struct KuCoinClient {
    client: Client,
}

impl KuCoinClient {
    /// Creates a new KuCoin client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    fn level1_url(&self, asset: Asset) -> String {
        format!(
            "{}{}?symbol={}",
            KUCOIN_API_URL,
            KUCOIN_LEVEL1_ENDPOINT,
            asset.kucoin_pair()
        )
    }
}

#[async_trait]
impl ExchangeClient for KuCoinClient {
    async fn fetch_price(&self, asset: Asset) -> Result<PriceQuote, FetchError> {
        let url = self.level1_url(asset);
        tracing::debug!(%url, "Fetching price from KuCoin");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let envelope: KuCoinEnvelope = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse KuCoin response: {e}"))
        })?;

        if envelope.code != "200000" {
            return Err(FetchError::Parse(format!(
                "KuCoin error code {}: {}",
                envelope.code,
                envelope.msg.unwrap_or_default()
            )));
        }

        let data = envelope.data.ok_or_else(|| {
            FetchError::Parse("KuCoin response has no data field".to_string())
        })?;

        let price = data.price.parse::<f64>().map_err(|_| {
            FetchError::Parse(format!("KuCoin price is not numeric: '{}'", data.price))
        })?;
        let price = require_positive(price)?;

        Ok(PriceQuote::new(asset, price, self.source_name()))
    }

    fn source_name(&self) -> &'static str {
        "kucoin"
    }
}
