//! Core types for the dashboard data SDK

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cryptocurrency assets tracked by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Bitcoin
    BTC,
    /// Ethereum
    ETH,
    /// BNB
    BNB,
    /// Polygon
    POL,
}

impl Asset {
    /// Get the asset symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::BTC => "BTC",
            Asset::ETH => "ETH",
            Asset::BNB => "BNB",
            Asset::POL => "POL",
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Asset::BTC => "Bitcoin",
            Asset::ETH => "Ethereum",
            Asset::BNB => "BNB",
            Asset::POL => "Polygon",
        }
    }

    /// Get the CoinGecko ID for this asset
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::BTC => "bitcoin",
            Asset::ETH => "ethereum",
            Asset::BNB => "binancecoin",
            Asset::POL => "polygon",
        }
    }

    /// Binance spot trading pair against USDT
    pub fn binance_pair(&self) -> &'static str {
        match self {
            Asset::BTC => "BTCUSDT",
            Asset::ETH => "ETHUSDT",
            Asset::BNB => "BNBUSDT",
            Asset::POL => "POLUSDT",
        }
    }

    /// KuCoin trading pair (BASE-QUOTE format)
    pub fn kucoin_pair(&self) -> &'static str {
        match self {
            Asset::BTC => "BTC-USDT",
            Asset::ETH => "ETH-USDT",
            Asset::BNB => "BNB-USDT",
            Asset::POL => "MATIC-USDT",
        }
    }

    /// Coinbase trading pair. BNB is not listed on Coinbase; POL
    /// trades under its former MATIC ticker.
    pub fn coinbase_pair(&self) -> Option<&'static str> {
        match self {
            Asset::BTC => Some("BTC-USD"),
            Asset::ETH => Some("ETH-USD"),
            Asset::BNB => None,
            Asset::POL => Some("MATIC-USD"),
        }
    }

    /// Get all tracked assets
    pub fn all() -> &'static [Asset] {
        crate::constants::TRACKED_ASSETS
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.symbol())
    }
}

/// A spot price observed from one source.
///
/// Immutable once created; the price is always positive (clients reject
/// non-positive values before constructing a quote).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// The asset
    pub asset: Asset,

    /// Price in USD
    pub price_usd: f64,

    /// Source that served the value
    pub source: String,

    /// When the value was fetched
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    /// Create a new quote stamped with the current time
    pub fn new(asset: Asset, price_usd: f64, source: impl Into<String>) -> Self {
        Self {
            asset,
            price_usd,
            source: source.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Age of the quote
    pub fn age(&self) -> std::time::Duration {
        let elapsed = Utc::now().signed_duration_since(self.fetched_at);
        std::time::Duration::from_secs(elapsed.num_seconds().max(0) as u64)
    }

    /// Whether the quote is older than the given threshold
    pub fn is_stale(&self, threshold: std::time::Duration) -> bool {
        self.age() > threshold
    }

    /// Sanity check used by validation and tests; not correctness-critical.
    pub fn is_plausible(&self) -> bool {
        let (lo, hi) = match self.asset {
            Asset::BTC => (100.0, 10_000_000.0),
            Asset::ETH => (1.0, 1_000_000.0),
            Asset::BNB => (0.1, 100_000.0),
            Asset::POL => (0.001, 10_000.0),
        };
        self.price_usd.is_finite() && self.price_usd >= lo && self.price_usd <= hi
    }
}

/// Recommended fee rates in sat/vB per confirmation-priority tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimate {
    pub fastest_fee: f64,
    pub half_hour_fee: f64,
    pub hour_fee: f64,
    pub economy_fee: f64,
    pub minimum_fee: f64,
}

impl std::fmt::Display for FeeEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<12} {:>8}", "PRIORITY", "SAT/VB")?;
        writeln!(f, "{:<12} {:>8.1}", "fastest", self.fastest_fee)?;
        writeln!(f, "{:<12} {:>8.1}", "half hour", self.half_hour_fee)?;
        writeln!(f, "{:<12} {:>8.1}", "hour", self.hour_fee)?;
        writeln!(f, "{:<12} {:>8.1}", "economy", self.economy_fee)?;
        write!(f, "{:<12} {:>8.1}", "minimum", self.minimum_fee)
    }
}

/// Market sentiment reading from the Fear & Greed index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreedIndex {
    /// Index value, 0 (extreme fear) to 100 (extreme greed)
    pub value: u32,

    /// Upstream classification label ("Fear", "Greed", ...)
    pub classification: String,

    /// When the index was published
    pub as_of: DateTime<Utc>,
}

impl std::fmt::Display for FearGreedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fear & Greed: {} ({})", self.value, self.classification)
    }
}

/// One sample of the network statistics series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatPoint {
    /// Sample timestamp
    pub timestamp: DateTime<Utc>,

    /// Transactions observed in the sample window
    pub tx_count: u64,

    /// Average block size in bytes
    pub avg_block_size: f64,
}

/// Progress of the current difficulty epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustment {
    /// Percent of the epoch elapsed
    pub progress_percent: f64,

    /// Projected difficulty change in percent
    pub difficulty_change: f64,

    /// Blocks remaining until the retarget
    pub remaining_blocks: u64,

    /// Seconds remaining until the retarget
    pub remaining_time: i64,
}

/// One OHLC candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcCandle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Overall system health status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// Fresh data is available
    Healthy,
    /// Data is available but stale or partial
    Degraded,
    /// No data is available
    Unhealthy,
}

/// Component health information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional status message
    pub message: Option<String>,
    /// Component-specific details
    pub details: std::collections::HashMap<String, serde_json::Value>,
    /// Last checked timestamp
    pub last_checked: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coinbase_has_no_bnb_listing() {
        assert_eq!(Asset::BNB.coinbase_pair(), None);
        assert_eq!(Asset::POL.coinbase_pair(), Some("MATIC-USD"));
    }

    #[test]
    fn fresh_quote_is_not_stale() {
        let quote = PriceQuote::new(Asset::BTC, 50_000.0, "binance");
        assert!(!quote.is_stale(std::time::Duration::from_secs(300)));
        assert!(quote.is_plausible());
    }

    #[test]
    fn fee_estimate_parses_mempool_schema() {
        let json = r#"{"fastestFee":15,"halfHourFee":12,"hourFee":8,"economyFee":5,"minimumFee":1}"#;
        let fees: FeeEstimate = serde_json::from_str(json).unwrap();
        assert_eq!(fees.fastest_fee, 15.0);
        assert_eq!(fees.minimum_fee, 1.0);
    }

    #[test]
    fn difficulty_adjustment_parses_mempool_schema() {
        let json = r#"{"progressPercent":51.2,"difficultyChange":-2.4,"remainingBlocks":983,"remainingTime":574000,"estimatedRetargetDate":1700000000}"#;
        let adj: DifficultyAdjustment = serde_json::from_str(json).unwrap();
        assert_eq!(adj.remaining_blocks, 983);
        assert!(adj.difficulty_change < 0.0);
    }
}
