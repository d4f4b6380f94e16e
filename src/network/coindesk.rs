//! CoinDesk Bitcoin Price Index client
//!
//! The endpoint has a history of DNS trouble; callers are expected to
//! fall back to another source when it fails (see the service layer).

use crate::{
    client::{check_status, default_http_client, require_positive},
    constants::COINDESK_BPI_URL,
    error::FetchError,
    types::{Asset, PriceQuote},
};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BpiResponse {
    bpi: Bpi,
}

#[derive(Debug, Deserialize)]
struct Bpi {
    #[serde(rename = "USD")]
    usd: BpiCurrency,
}

/// The USD rate is a comma-grouped string like "43,123.4567"
#[derive(Debug, Deserialize)]
struct BpiCurrency {
    rate: String,
}

/// Client for the CoinDesk Bitcoin Price Index
pub struct CoindeskClient {
    client: Client,
}

impl CoindeskClient {
    /// Creates a new CoinDesk client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    /// Fetches the current Bitcoin spot price
    pub async fn fetch_btc_price(&self) -> Result<PriceQuote, FetchError> {
        tracing::debug!(url = COINDESK_BPI_URL, "Fetching BTC price from CoinDesk");

        let response = self
            .client
            .get(COINDESK_BPI_URL)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let parsed: BpiResponse = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse CoinDesk response: {e}"))
        })?;

        let price = parse_rate(&parsed.bpi.usd.rate)?;
        Ok(PriceQuote::new(Asset::BTC, price, "coindesk"))
    }
}

fn parse_rate(rate: &str) -> Result<f64, FetchError> {
    let price = rate.replace(',', "").parse::<f64>().map_err(|_| {
        FetchError::Parse(format!("CoinDesk rate is not numeric: '{rate}'"))
    })?;
    require_positive(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_grouped_rate_parses() {
        assert_eq!(parse_rate("43,123.4567").unwrap(), 43_123.4567);
        assert_eq!(parse_rate("999.01").unwrap(), 999.01);
    }

    #[test]
    fn garbage_rate_is_a_parse_failure() {
        assert!(matches!(parse_rate("n/a"), Err(FetchError::Parse(_))));
        assert!(matches!(parse_rate("0"), Err(FetchError::Parse(_))));
    }

    #[test]
    fn bpi_schema_decodes() {
        let raw = r#"{"time":{"updated":"Nov 14, 2023 12:00:00 UTC"},
            "bpi":{"USD":{"code":"USD","rate":"36,512.9033","rate_float":36512.9033}}}"#;
        let parsed: BpiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parse_rate(&parsed.bpi.usd.rate).unwrap(), 36_512.9033);
    }
}
