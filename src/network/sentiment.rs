//! Alternative.me Fear & Greed index client

use crate::{
    client::{check_status, default_http_client},
    constants::FEAR_GREED_URL,
    error::FetchError,
    types::FearGreedIndex,
};
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

/// The index arrives as strings: `{"data":[{"value":"54",...}]}`
#[derive(Debug, Deserialize)]
struct FngResponse {
    data: Vec<FngEntry>,
}

#[derive(Debug, Deserialize)]
struct FngEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

/// Client for the Alternative.me sentiment index
pub struct SentimentClient {
    client: Client,
}

impl SentimentClient {
    /// Creates a new sentiment client
    pub fn new() -> Result<Self, FetchError> {
        Ok(Self {
            client: default_http_client()?,
        })
    }

    /// Fetches the current Fear & Greed index reading
    pub async fn fetch_fear_greed(&self) -> Result<FearGreedIndex, FetchError> {
        tracing::debug!(url = FEAR_GREED_URL, "Fetching Fear & Greed index");

        let response = self
            .client
            .get(FEAR_GREED_URL)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = check_status(response).await?;

        let parsed: FngResponse = response.json().await.map_err(|e| {
            FetchError::Parse(format!("Failed to parse Fear & Greed response: {e}"))
        })?;

        let entry = parsed.data.into_iter().next().ok_or_else(|| {
            FetchError::Parse("Fear & Greed response has no data entries".to_string())
        })?;

        parse_entry(entry)
    }
}

fn parse_entry(entry: FngEntry) -> Result<FearGreedIndex, FetchError> {
    let value = entry.value.parse::<u32>().map_err(|_| {
        FetchError::Parse(format!("Fear & Greed value is not numeric: '{}'", entry.value))
    })?;

    let epoch = entry.timestamp.parse::<i64>().map_err(|_| {
        FetchError::Parse(format!(
            "Fear & Greed timestamp is not numeric: '{}'",
            entry.timestamp
        ))
    })?;
    let as_of = DateTime::from_timestamp(epoch, 0).ok_or_else(|| {
        FetchError::Parse(format!("Fear & Greed timestamp out of range: {epoch}"))
    })?;

    Ok(FearGreedIndex {
        value,
        classification: entry.value_classification,
        as_of,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_fields_parse_into_typed_index() {
        let raw = r#"{"name":"Fear and Greed Index","data":[
            {"value":"54","value_classification":"Neutral","timestamp":"1700000000","time_until_update":"3600"}
        ]}"#;
        let parsed: FngResponse = serde_json::from_str(raw).unwrap();
        let index = parse_entry(parsed.data.into_iter().next().unwrap()).unwrap();

        assert_eq!(index.value, 54);
        assert_eq!(index.classification, "Neutral");
        assert_eq!(index.as_of.timestamp(), 1_700_000_000);
    }

    #[test]
    fn non_numeric_value_is_a_parse_failure() {
        let entry = FngEntry {
            value: "n/a".to_string(),
            value_classification: "Unknown".to_string(),
            timestamp: "1700000000".to_string(),
        };
        assert!(matches!(parse_entry(entry), Err(FetchError::Parse(_))));
    }
}
