//! Dashboard service: the composition root the presentation layer uses
//!
//! Owns the cache, the price aggregator, the network clients and the
//! diagnostics log, all constructed explicitly. Every read is
//! cache-gated; every underlying fetch is recorded in the diagnostics
//! log. There are no background tasks - callers drive each refresh.

use crate::{
    aggregator::{AggregatedPrices, PriceAggregator},
    cache::{Cached, DataCache},
    constants::{
        CACHE_KEY_BTC_OHLC, CACHE_KEY_BTC_PRICE, CACHE_KEY_CRYPTO_PRICES, CACHE_KEY_DIFFICULTY,
        CACHE_KEY_FEAR_GREED, CACHE_KEY_MEMPOOL_FEES, CACHE_KEY_NETWORK_STATS, DEFAULT_CACHE_TTL,
        TRACKED_ASSETS,
    },
    diagnostics::DiagnosticsLog,
    client::ExchangeClient,
    error::FetchError,
    exchanges::CoinGeckoClient,
    network::{BitfinexClient, CoindeskClient, MempoolClient, SentimentClient},
    portfolio::{Portfolio, PortfolioValuation},
    types::{
        Asset, ComponentHealth, DifficultyAdjustment, FearGreedIndex, FeeEstimate, HealthStatus,
        NetworkStatPoint, OhlcCandle, PriceQuote,
    },
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Facade over every data source the dashboard renders.
///
/// # Example
/// ```no_run
/// use crypto_dashboard_sdk::{Asset, DashboardService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = DashboardService::new()?;
///
/// let prices = service.crypto_prices().await?;
/// if let Some(btc) = prices.value.quote(Asset::BTC) {
///     println!("BTC: ${:.2} via {}", btc.price_usd, btc.source);
/// }
/// # Ok(())
/// # }
/// ```
pub struct DashboardService {
    cache: DataCache,
    aggregator: PriceAggregator,
    coingecko: CoinGeckoClient,
    mempool: MempoolClient,
    sentiment: SentimentClient,
    coindesk: CoindeskClient,
    bitfinex: BitfinexClient,
    diagnostics: Arc<DiagnosticsLog>,
}

impl DashboardService {
    /// Creates a service over the default source set
    pub fn new() -> Result<Self, FetchError> {
        let diagnostics = Arc::new(DiagnosticsLog::new());
        let aggregator =
            PriceAggregator::with_default_sources()?.with_diagnostics(diagnostics.clone());
        Self::assemble(aggregator, diagnostics)
    }

    /// Creates a service around a custom aggregator.
    ///
    /// This is primarily for tests injecting mock exchanges.
    pub fn with_aggregator(aggregator: PriceAggregator) -> Result<Self, FetchError> {
        let diagnostics = Arc::new(DiagnosticsLog::new());
        Self::assemble(aggregator.with_diagnostics(diagnostics.clone()), diagnostics)
    }

    fn assemble(
        aggregator: PriceAggregator,
        diagnostics: Arc<DiagnosticsLog>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            cache: DataCache::new(),
            aggregator,
            coingecko: CoinGeckoClient::new()?,
            mempool: MempoolClient::new()?,
            sentiment: SentimentClient::new()?,
            coindesk: CoindeskClient::new()?,
            bitfinex: BitfinexClient::new()?,
            diagnostics,
        })
    }

    /// Aggregated spot prices for every tracked asset, cache-gated.
    ///
    /// Only a pass that produced zero quotes counts as a failure; a
    /// partial snapshot is stored and served like any other value.
    pub async fn crypto_prices(&self) -> Result<Cached<AggregatedPrices>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_CRYPTO_PRICES, DEFAULT_CACHE_TTL, || async {
                let snapshot = self.aggregator.get_prices(TRACKED_ASSETS).await;
                if snapshot.quotes.is_empty() {
                    Err(FetchError::Unavailable(format!(
                        "all price sources failed: {}",
                        snapshot.errors.join("; ")
                    )))
                } else {
                    Ok(snapshot)
                }
            })
            .await
    }

    /// Bitcoin spot price: CoinDesk first, CoinGecko on failure
    pub async fn btc_price(&self) -> Result<Cached<PriceQuote>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_BTC_PRICE, DEFAULT_CACHE_TTL, || async {
                let started = Instant::now();
                let primary = self.coindesk.fetch_btc_price().await;
                self.diagnostics
                    .record_result("coindesk", "/v1/bpi/currentprice.json", &primary, started.elapsed())
                    .await;

                match primary {
                    Ok(quote) => Ok(quote),
                    Err(primary_err) => {
                        tracing::warn!(
                            error = %primary_err,
                            "CoinDesk failed, falling back to CoinGecko"
                        );
                        let started = Instant::now();
                        let fallback = self.coingecko.fetch_price(Asset::BTC).await;
                        self.diagnostics
                            .record_result("coingecko", "/simple/price", &fallback, started.elapsed())
                            .await;
                        fallback.map_err(|fallback_err| {
                            FetchError::Unavailable(format!(
                                "coindesk: {primary_err}; coingecko: {fallback_err}"
                            ))
                        })
                    }
                }
            })
            .await
    }

    /// Recommended mempool fee rates, cache-gated
    pub async fn mempool_fees(&self) -> Result<Cached<FeeEstimate>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_MEMPOOL_FEES, DEFAULT_CACHE_TTL, || async {
                let started = Instant::now();
                let result = self.mempool.fetch_recommended_fees().await;
                self.diagnostics
                    .record_result("mempool.space", "/fees/recommended", &result, started.elapsed())
                    .await;
                result
            })
            .await
    }

    /// One-week network statistics series, cache-gated
    pub async fn network_stats(&self) -> Result<Cached<Vec<NetworkStatPoint>>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_NETWORK_STATS, DEFAULT_CACHE_TTL, || async {
                let started = Instant::now();
                let result = self.mempool.fetch_network_stats().await;
                self.diagnostics
                    .record_result("mempool.space", "/statistics/1w", &result, started.elapsed())
                    .await;
                result
            })
            .await
    }

    /// Difficulty epoch progress, cache-gated
    pub async fn difficulty_adjustment(&self) -> Result<Cached<DifficultyAdjustment>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_DIFFICULTY, DEFAULT_CACHE_TTL, || async {
                let started = Instant::now();
                let result = self.mempool.fetch_difficulty_adjustment().await;
                self.diagnostics
                    .record_result(
                        "mempool.space",
                        "/difficulty-adjustment",
                        &result,
                        started.elapsed(),
                    )
                    .await;
                result
            })
            .await
    }

    /// Fear & Greed sentiment index, cache-gated
    pub async fn fear_greed(&self) -> Result<Cached<FearGreedIndex>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_FEAR_GREED, DEFAULT_CACHE_TTL, || async {
                let started = Instant::now();
                let result = self.sentiment.fetch_fear_greed().await;
                self.diagnostics
                    .record_result("alternative.me", "/fng/", &result, started.elapsed())
                    .await;
                result
            })
            .await
    }

    /// Weekly BTC candle history since 2013, cache-gated
    pub async fn btc_ohlc_history(&self) -> Result<Cached<Vec<OhlcCandle>>, FetchError> {
        self.cache
            .get_or_fetch(CACHE_KEY_BTC_OHLC, DEFAULT_CACHE_TTL, || async {
                let started = Instant::now();
                let result = self.bitfinex.fetch_history().await;
                self.diagnostics
                    .record_result("bitfinex", "/candles", &result, started.elapsed())
                    .await;
                result
            })
            .await
    }

    /// Values a portfolio against the current price snapshot.
    ///
    /// Never fails: when no snapshot can be obtained at all, every
    /// holding is flagged unavailable instead.
    pub async fn portfolio_valuation(&self, portfolio: &Portfolio) -> PortfolioValuation {
        match self.crypto_prices().await {
            Ok(cached) => portfolio.valuation(&cached.value),
            Err(err) => {
                tracing::warn!(error = %err, "No prices for portfolio valuation");
                portfolio.valuation(&AggregatedPrices::empty())
            }
        }
    }

    /// Drops the cached price snapshots so the next read refetches
    pub async fn refresh_prices(&self) {
        self.cache.invalidate(CACHE_KEY_CRYPTO_PRICES).await;
        self.cache.invalidate(CACHE_KEY_BTC_PRICE).await;
    }

    /// Health derived from cache contents and the diagnostics log
    pub async fn health_check(&self) -> ComponentHealth {
        let mut details = HashMap::new();
        details.insert(
            "cached_entries".to_string(),
            serde_json::json!(self.cache.entry_count().await),
        );

        let price_age = self.cache.entry_age(CACHE_KEY_CRYPTO_PRICES).await;
        details.insert(
            "price_cache_age_secs".to_string(),
            serde_json::json!(price_age.map(|a| a.as_secs())),
        );

        let failures = self.diagnostics.failures().await.len();
        details.insert("logged_failures".to_string(), serde_json::json!(failures));

        let status = match price_age {
            None => HealthStatus::Unhealthy,
            Some(age) if age > DEFAULT_CACHE_TTL => HealthStatus::Degraded,
            Some(_) => HealthStatus::Healthy,
        };

        let message = match status {
            HealthStatus::Healthy => "Fresh price data is available".to_string(),
            HealthStatus::Degraded => "Price data is older than its TTL".to_string(),
            HealthStatus::Unhealthy => "No price data has been fetched".to_string(),
        };

        ComponentHealth {
            name: "dashboard_service".to_string(),
            status,
            message: Some(message),
            details,
            last_checked: Utc::now(),
        }
    }

    /// The diagnostics log backing the debug viewer
    pub fn diagnostics(&self) -> Arc<DiagnosticsLog> {
        self.diagnostics.clone()
    }

    /// The cache this service reads through
    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Configured price sources, in priority order
    pub fn source_names(&self) -> Vec<&'static str> {
        self.aggregator.source_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockExchange, MockOutcome};

    fn service_with(mocks: Vec<Arc<MockExchange>>) -> DashboardService {
        let aggregator = PriceAggregator::new(
            mocks
                .into_iter()
                .map(|m| m as Arc<dyn ExchangeClient>)
                .collect(),
        );
        DashboardService::with_aggregator(aggregator).unwrap()
    }

    fn mock_with_all_prices(name: &'static str) -> Arc<MockExchange> {
        let mock = Arc::new(MockExchange::named(name));
        mock.set_price(Asset::BTC, 43_000.0);
        mock.set_price(Asset::ETH, 2_300.0);
        mock.set_price(Asset::BNB, 310.0);
        mock.set_price(Asset::POL, 0.55);
        mock
    }

    #[tokio::test]
    async fn second_price_read_is_served_from_cache() {
        let mock = mock_with_all_prices("mock");
        let service = service_with(vec![mock.clone()]);

        let first = service.crypto_prices().await.unwrap();
        assert_eq!(first.value.success_count(), 4);
        let calls_after_first = mock.call_count();

        let second = service.crypto_prices().await.unwrap();
        assert_eq!(second.value.success_count(), 4);
        assert!(!second.stale);
        assert_eq!(mock.call_count(), calls_after_first, "cache must absorb the read");
    }

    #[tokio::test]
    async fn total_source_failure_without_cache_is_unavailable() {
        let mock = Arc::new(MockExchange::named("mock"));
        mock.set_outcome(Asset::BTC, MockOutcome::Http(500));
        mock.set_outcome(Asset::ETH, MockOutcome::Http(500));
        mock.set_outcome(Asset::BNB, MockOutcome::Http(500));
        mock.set_outcome(Asset::POL, MockOutcome::Http(500));
        let service = service_with(vec![mock]);

        let err = service.crypto_prices().await.unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn valuation_degrades_per_asset_not_per_portfolio() {
        let mock = Arc::new(MockExchange::named("mock"));
        mock.set_price(Asset::BTC, 100.0);
        // ETH/BNB/POL unscripted -> unavailable
        let service = service_with(vec![mock]);

        let mut portfolio = Portfolio::new();
        portfolio.set_holding(Asset::BTC, 1.0).unwrap();
        portfolio.set_holding(Asset::ETH, 2.0).unwrap();

        let valuation = service.portfolio_valuation(&portfolio).await;
        assert_eq!(valuation.total_usd, 100.0);
        assert_eq!(valuation.unavailable, vec![Asset::ETH]);
    }

    #[tokio::test]
    async fn valuation_survives_total_price_outage() {
        let mock = Arc::new(MockExchange::named("mock"));
        mock.set_outcome(Asset::BTC, MockOutcome::Timeout);
        mock.set_outcome(Asset::ETH, MockOutcome::Timeout);
        mock.set_outcome(Asset::BNB, MockOutcome::Timeout);
        mock.set_outcome(Asset::POL, MockOutcome::Timeout);
        let service = service_with(vec![mock]);

        let valuation = service.portfolio_valuation(&Portfolio::default_demo()).await;
        assert_eq!(valuation.total_usd, 0.0);
        assert_eq!(valuation.unavailable.len(), 4);
    }

    #[tokio::test]
    async fn health_goes_from_unhealthy_to_healthy_after_a_fetch() {
        let mock = mock_with_all_prices("mock");
        let service = service_with(vec![mock]);

        let before = service.health_check().await;
        assert_eq!(before.status, HealthStatus::Unhealthy);

        service.crypto_prices().await.unwrap();

        let after = service.health_check().await;
        assert_eq!(after.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn refresh_invalidates_the_price_snapshot() {
        let mock = mock_with_all_prices("mock");
        let service = service_with(vec![mock.clone()]);

        service.crypto_prices().await.unwrap();
        let calls = mock.call_count();

        service.refresh_prices().await;
        service.crypto_prices().await.unwrap();
        assert!(mock.call_count() > calls, "invalidation must force a refetch");
    }

    #[tokio::test]
    async fn source_attempts_land_in_the_diagnostics_log() {
        let mock = mock_with_all_prices("mock");
        let service = service_with(vec![mock]);

        service.crypto_prices().await.unwrap();

        let log = service.diagnostics();
        assert!(!log.is_empty().await);
        let stats = log.source_stats("mock").await;
        assert_eq!(stats.failed_requests, 0);
        assert!(stats.total_requests >= 1);
    }
}
