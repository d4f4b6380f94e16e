//! Bitfinex candle client for BTC OHLC history

use crate::{
    client::{check_status, default_http_client},
    constants::{
        BITFINEX_API_URL, BITFINEX_CANDLE_TIMEFRAME, MAX_OHLC_REQUESTS, OHLC_BATCH_LIMIT,
        OHLC_HISTORY_START_SECS,
    },
    error::FetchError,
    types::OhlcCandle,
};
use chrono::{DateTime, Utc};
use reqwest::Client;

/// Bitfinex serves candles as bare arrays:
/// `[timestamp_ms, open, close, high, low, volume]`
type WireCandle = (i64, f64, f64, f64, f64, f64);

/// Client for the Bitfinex public candle API
pub struct BitfinexClient {
    client: Client,
}

impl BitfinexClient {
    /// Creates a new Bitfinex client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    fn candles_url(start_ms: Option<i64>, limit: u32) -> String {
        let base = format!(
            "{BITFINEX_API_URL}/candles/trade:{BITFINEX_CANDLE_TIMEFRAME}:tBTCUSD/hist?limit={limit}&sort=1"
        );
        match start_ms {
            Some(start) => format!("{base}&start={start}"),
            None => base,
        }
    }

    async fn fetch_batch(
        &self,
        start_ms: Option<i64>,
        limit: u32,
    ) -> Result<Vec<OhlcCandle>, FetchError> {
        let url = Self::candles_url(start_ms, limit);
        tracing::debug!(%url, "Fetching candles from Bitfinex");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let wire: Vec<WireCandle> = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse Bitfinex candles: {e}"))
        })?;

        Ok(wire.into_iter().filter_map(candle_from_wire).collect())
    }

    /// Fetches one ascending batch of weekly BTC candles
    pub async fn fetch_candles(
        &self,
        start: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<OhlcCandle>, FetchError> {
        self.fetch_batch(start.map(|s| s.timestamp_millis()), limit)
            .await
    }

    /// Backfills weekly BTC candle history from 2013 to the present.
    ///
    /// Pages forward from the history start, at most
    /// [`MAX_OHLC_REQUESTS`] batches; each page resumes one millisecond
    /// past the previous batch's last candle.
    pub async fn fetch_history(&self) -> Result<Vec<OhlcCandle>, FetchError> {
        let mut all: Vec<OhlcCandle> = Vec::new();
        let mut start_ms = OHLC_HISTORY_START_SECS * 1000;

        for _ in 0..MAX_OHLC_REQUESTS {
            let batch = self.fetch_batch(Some(start_ms), OHLC_BATCH_LIMIT).await?;
            if batch.is_empty() {
                break;
            }

            let batch_len = batch.len();
            if let Some(last) = batch.last() {
                start_ms = last.timestamp.timestamp_millis() + 1;
            }
            all.extend(batch);

            if batch_len < OHLC_BATCH_LIMIT as usize {
                break;
            }
        }

        if all.is_empty() {
            return Err(FetchError::Parse(
                "Bitfinex returned no candle history".to_string(),
            ));
        }

        tracing::debug!(candles = all.len(), "Candle history backfill complete");
        Ok(all)
    }
}

fn candle_from_wire(wire: WireCandle) -> Option<OhlcCandle> {
    let (ts_ms, open, close, high, low, volume) = wire;
    let timestamp = DateTime::from_timestamp_millis(ts_ms)?;
    Some(OhlcCandle {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candles_url_sorts_ascending_with_start() {
        let url = BitfinexClient::candles_url(Some(1_356_998_400_000), 5000);
        assert_eq!(
            url,
            "https://api-pub.bitfinex.com/v2/candles/trade:7D:tBTCUSD/hist?limit=5000&sort=1&start=1356998400000"
        );
    }

    #[test]
    fn wire_candle_reorders_to_ohlc() {
        // Bitfinex order is open, CLOSE, high, low
        let wire: Vec<WireCandle> =
            serde_json::from_str("[[1356998400000, 13.5, 13.9, 14.2, 13.1, 1000.0]]").unwrap();
        let candle = candle_from_wire(wire[0]).unwrap();

        assert_eq!(candle.open, 13.5);
        assert_eq!(candle.close, 13.9);
        assert_eq!(candle.high, 14.2);
        assert_eq!(candle.low, 13.1);
        assert_eq!(candle.timestamp.timestamp(), 1_356_998_400);
    }
}
