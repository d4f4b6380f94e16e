//! Constants for the dashboard data SDK.
//!
//! All configuration is centralized here. No runtime configuration
//! (config files, environment variables) is used - the crate operates
//! with these compile-time constants.

use crate::types::Asset;
use std::time::Duration;

/// HTTP request timeout applied uniformly to every outbound call (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default time-to-live for cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Maximum number of diagnostic records retained in memory
pub const MAX_DIAGNOSTIC_RECORDS: usize = 2000;

/// User agent for HTTP requests
pub const USER_AGENT: &str = "crypto-dashboard-sdk/0.1.0";

/// Assets tracked by the dashboard
pub const TRACKED_ASSETS: &[Asset] = &[Asset::BTC, Asset::ETH, Asset::BNB, Asset::POL];

// --- Exchange endpoints ---

/// Binance API base URL
pub const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

/// Binance spot ticker endpoint
pub const BINANCE_TICKER_ENDPOINT: &str = "/ticker/price";

/// KuCoin API base URL
pub const KUCOIN_API_URL: &str = "https://api.kucoin.com/api/v1";

/// KuCoin level-1 orderbook endpoint
pub const KUCOIN_LEVEL1_ENDPOINT: &str = "/market/orderbook/level1";

/// Coinbase Exchange API base URL
pub const COINBASE_API_URL: &str = "https://api.exchange.coinbase.com";

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for simple price queries
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

// --- Network / metrics endpoints ---

/// CoinDesk Bitcoin Price Index endpoint
pub const COINDESK_BPI_URL: &str = "https://api.coindesk.com/v1/bpi/currentprice.json";

/// Alternative.me Fear & Greed Index endpoint
pub const FEAR_GREED_URL: &str = "https://api.alternative.me/fng/";

/// Mempool.space API base URL
pub const MEMPOOL_API_URL: &str = "https://mempool.space/api/v1";

/// Window for the mempool.space network statistics series.
/// Only `1w` exists upstream; there is no `2w` variant.
pub const NETWORK_STATS_WINDOW: &str = "1w";

/// Bitfinex public API base URL
pub const BITFINEX_API_URL: &str = "https://api-pub.bitfinex.com/v2";

/// Candle timeframe for OHLC history (weekly candles)
pub const BITFINEX_CANDLE_TIMEFRAME: &str = "7D";

/// Start of OHLC history: 2013-01-01 UTC, when BTC trading on major
/// exchanges begins
pub const OHLC_HISTORY_START_SECS: i64 = 1_356_998_400;

/// Maximum candles requested per Bitfinex batch
pub const OHLC_BATCH_LIMIT: u32 = 5000;

/// Maximum paged requests when backfilling OHLC history
pub const MAX_OHLC_REQUESTS: usize = 6;

// --- Cache keys ---

pub const CACHE_KEY_CRYPTO_PRICES: &str = "crypto_prices";
pub const CACHE_KEY_BTC_PRICE: &str = "btc_price";
pub const CACHE_KEY_MEMPOOL_FEES: &str = "mempool_fees";
pub const CACHE_KEY_NETWORK_STATS: &str = "network_stats";
pub const CACHE_KEY_DIFFICULTY: &str = "difficulty_adjustment";
pub const CACHE_KEY_FEAR_GREED: &str = "fear_greed";
pub const CACHE_KEY_BTC_OHLC: &str = "btc_ohlc";
