//! # Crypto Dashboard Data SDK
//!
//! Fetches cryptocurrency market and Bitcoin network data from public
//! HTTP APIs, caches responses briefly in memory, and exposes typed,
//! view-ready values for a dashboard to render.
//!
//! Spot prices are aggregated across exchanges in a fixed priority
//! order (Binance, KuCoin, Coinbase, CoinGecko): the first source to
//! answer wins and is annotated on the quote; when every source fails
//! the result is a distinct unavailable sentinel, never a null-like
//! value. Reads go through a TTL cache that serves the previous value,
//! flagged stale, when a refetch fails.
//!
//! ## Usage
//!
//! ```no_run
//! use crypto_dashboard_sdk::{Asset, DashboardService, Portfolio};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = DashboardService::new()?;
//!
//! // Aggregated spot prices (cache-gated)
//! let prices = service.crypto_prices().await?;
//! for (asset, quote) in &prices.value.quotes {
//!     println!("{}: ${:.2} via {}", asset, quote.price_usd, quote.source);
//! }
//!
//! // Portfolio valuation; a missing price flags the asset instead of
//! // failing the whole calculation
//! let mut portfolio = Portfolio::new();
//! portfolio.set_holding(Asset::BTC, 0.5)?;
//! let valuation = service.portfolio_valuation(&portfolio).await;
//! println!("{valuation}");
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod cache;
pub mod client;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod exchanges;
pub mod indicators;
pub mod network;
pub mod portfolio;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use aggregator::{AggregatedPrices, PriceAggregator};
pub use cache::{Cached, DataCache};
pub use client::ExchangeClient;
pub use diagnostics::{ApiCallRecord, CallOutcome, DiagnosticsLog, SourceStats};
pub use error::{FetchError, PriceUnavailable, SourceFailure};
pub use portfolio::{HoldingValue, Portfolio, PortfolioValuation};
pub use service::DashboardService;
pub use types::{
    Asset, ComponentHealth, DifficultyAdjustment, FearGreedIndex, FeeEstimate, HealthStatus,
    NetworkStatPoint, OhlcCandle, PriceQuote,
};
