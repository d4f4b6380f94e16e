//! Mempool.space client: fee estimates, network statistics, difficulty

use crate::{
    client::{check_status, default_http_client},
    constants::{MEMPOOL_API_URL, NETWORK_STATS_WINDOW},
    error::FetchError,
    types::{DifficultyAdjustment, FeeEstimate, NetworkStatPoint},
};
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

/// Wire entry of the statistics series. Individual fields come and go
/// upstream, so each is optional and incomplete samples are dropped.
#[derive(Debug, Deserialize)]
struct StatisticsEntry {
    added: Option<i64>,
    tx_count: Option<u64>,
    avg_block_size: Option<f64>,
}

/// Client for the mempool.space REST API
pub struct MempoolClient {
    client: Client,
}

impl MempoolClient {
    /// Creates a new mempool.space client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    /// URL of the network statistics series.
    ///
    /// The window is pinned to `1w`; requesting `2w` returns 404
    /// upstream because that variant does not exist.
    pub(crate) fn statistics_url() -> String {
        format!("{MEMPOOL_API_URL}/statistics/{NETWORK_STATS_WINDOW}")
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!(%url, "Fetching from mempool.space");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;
        response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse mempool.space response: {e}"))
        })
    }

    /// Fetches recommended fee rates per priority tier
    pub async fn fetch_recommended_fees(&self) -> Result<FeeEstimate, FetchError> {
        let url = format!("{MEMPOOL_API_URL}/fees/recommended");
        self.get_json(&url).await
    }

    /// Fetches the one-week network statistics series
    pub async fn fetch_network_stats(&self) -> Result<Vec<NetworkStatPoint>, FetchError> {
        let entries: Vec<StatisticsEntry> = self.get_json(&Self::statistics_url()).await?;

        let points = entries
            .into_iter()
            .filter_map(|e| {
                let added = e.added?;
                let timestamp = DateTime::from_timestamp(added, 0)?;
                Some(NetworkStatPoint {
                    timestamp,
                    tx_count: e.tx_count?,
                    avg_block_size: e.avg_block_size?,
                })
            })
            .collect();

        Ok(points)
    }

    /// Fetches progress of the current difficulty epoch
    pub async fn fetch_difficulty_adjustment(&self) -> Result<DifficultyAdjustment, FetchError> {
        let url = format!("{MEMPOOL_API_URL}/difficulty-adjustment");
        self.get_json(&url).await
    }
}
