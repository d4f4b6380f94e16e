//! Error types for the dashboard data SDK

use thiserror::Error;

/// Errors that can occur when fetching from an external API.
///
/// Clients convert every lower-level fault into one of these variants;
/// no raw transport error crosses into the aggregator or cache layer.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network request failed (DNS, connection refused, TLS)
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Unexpected response shape
    #[error("Invalid response: {0}")]
    Parse(String),

    /// Asset not listed on this source
    #[error("Asset not supported: {0}")]
    UnsupportedAsset(String),

    /// Every source for the requested data was exhausted
    #[error("No data available: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Classifies a transport-level error, splitting timeouts out of
    /// the generic network case.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// A single failed attempt against one price source.
#[derive(Debug)]
pub struct SourceFailure {
    /// Source that was tried
    pub source: &'static str,
    /// Why the attempt failed
    pub error: FetchError,
}

/// Sentinel returned when every configured source failed for an asset.
///
/// This is a distinct type rather than a missing value, so "no price"
/// can never be mistaken for a legitimate price of zero. The ordered
/// attempt list retains per-source diagnostic detail for logging.
#[derive(Debug, Error)]
#[error("No price available for {asset}: all {} sources failed", .attempts.len())]
pub struct PriceUnavailable {
    /// Symbol the lookup was for
    pub asset: String,
    /// Every source tried, in priority order, with its failure
    pub attempts: Vec<SourceFailure>,
}

impl PriceUnavailable {
    /// Creates an empty sentinel for an asset
    pub fn new(asset: &str) -> Self {
        Self {
            asset: asset.to_string(),
            attempts: Vec::new(),
        }
    }

    /// Records one failed source attempt
    pub fn record(&mut self, source: &'static str, error: FetchError) {
        self.attempts.push(SourceFailure { source, error });
    }

    /// One-line summary of every attempt, for log output
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| format!("{}: {}", a.source, a.error))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
