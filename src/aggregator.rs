//! Multi-source price aggregation with fixed-priority fallback

use crate::{
    client::ExchangeClient,
    diagnostics::DiagnosticsLog,
    error::{FetchError, PriceUnavailable},
    exchanges::{BinanceClient, CoinGeckoClient, CoinbaseClient, KuCoinClient},
    types::{Asset, PriceQuote},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Snapshot produced by one aggregation pass.
///
/// Per-source failure detail is reduced to log-friendly strings here;
/// rich failure values live on [`PriceUnavailable`] for single-asset
/// lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedPrices {
    /// Quotes obtained, keyed by asset
    pub quotes: HashMap<Asset, PriceQuote>,

    /// Sources that contributed at least one quote, in the order tried
    pub sources_used: Vec<String>,

    /// Human-readable notes for every failure observed
    pub errors: Vec<String>,
}

impl AggregatedPrices {
    /// Snapshot with no quotes at all
    pub fn empty() -> Self {
        Self {
            quotes: HashMap::new(),
            sources_used: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Quote for one asset, if any source served it
    pub fn quote(&self, asset: Asset) -> Option<&PriceQuote> {
        self.quotes.get(&asset)
    }

    /// Number of assets that received a quote
    pub fn success_count(&self) -> usize {
        self.quotes.len()
    }
}

/// Aggregates spot prices across sources in a fixed priority order.
///
/// Serial attempts trade latency for availability; acceptable because
/// calls are cache-gated and not latency-critical.
pub struct PriceAggregator {
    clients: Vec<Arc<dyn ExchangeClient>>,
    diagnostics: Option<Arc<DiagnosticsLog>>,
}

impl PriceAggregator {
    /// Creates an aggregator over the given sources; order is priority.
    pub fn new(clients: Vec<Arc<dyn ExchangeClient>>) -> Self {
        Self {
            clients,
            diagnostics: None,
        }
    }

    /// Records every source attempt in the given diagnostics log
    pub fn with_diagnostics(mut self, diagnostics: Arc<DiagnosticsLog>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    async fn note_attempt<T>(
        &self,
        source: &str,
        endpoint: &str,
        result: &Result<T, FetchError>,
        started: Instant,
    ) {
        if let Some(diagnostics) = &self.diagnostics {
            diagnostics
                .record_result(source, endpoint, result, started.elapsed())
                .await;
        }
    }

    /// Default priority order: Binance, KuCoin, Coinbase, CoinGecko.
    pub fn with_default_sources() -> Result<Self, FetchError> {
        Ok(Self::new(vec![
            Arc::new(BinanceClient::new()?),
            Arc::new(KuCoinClient::new()?),
            Arc::new(CoinbaseClient::new()?),
            Arc::new(CoinGeckoClient::new()?),
        ]))
    }

    /// Names of the configured sources, in priority order
    pub fn source_names(&self) -> Vec<&'static str> {
        self.clients.iter().map(|c| c.source_name()).collect()
    }

    /// Fetches the price for one asset, first success wins.
    ///
    /// On exhaustion returns [`PriceUnavailable`] carrying every
    /// attempted source and its failure.
    pub async fn get_price(&self, asset: Asset) -> Result<PriceQuote, PriceUnavailable> {
        let mut unavailable = PriceUnavailable::new(asset.symbol());

        for client in &self.clients {
            let started = Instant::now();
            let attempt = client.fetch_price(asset).await;
            self.note_attempt(client.source_name(), "fetch_price", &attempt, started)
                .await;

            match attempt {
                Ok(quote) => {
                    tracing::debug!(
                        asset = asset.symbol(),
                        source = client.source_name(),
                        price = quote.price_usd,
                        "Price served"
                    );
                    return Ok(quote);
                }
                Err(e) => {
                    tracing::warn!(
                        asset = asset.symbol(),
                        source = client.source_name(),
                        error = %e,
                        "Price source failed"
                    );
                    unavailable.record(client.source_name(), e);
                }
            }
        }

        tracing::warn!(
            asset = asset.symbol(),
            attempts = %unavailable.summary(),
            "All price sources exhausted"
        );
        Err(unavailable)
    }

    /// Fetches prices for a set of assets.
    ///
    /// Walks sources in priority order, asking each only for the assets
    /// still missing, and stops as soon as every asset has a quote. A
    /// source that fails outright is noted and skipped.
    pub async fn get_prices(&self, assets: &[Asset]) -> AggregatedPrices {
        let mut result = AggregatedPrices::empty();

        for client in &self.clients {
            let missing: Vec<Asset> = assets
                .iter()
                .copied()
                .filter(|a| !result.quotes.contains_key(a))
                .collect();
            if missing.is_empty() {
                break;
            }

            let started = Instant::now();
            let attempt = client.fetch_prices(&missing).await;
            self.note_attempt(client.source_name(), "fetch_prices", &attempt, started)
                .await;

            match attempt {
                Ok(prices) if !prices.is_empty() => {
                    result.sources_used.push(client.source_name().to_string());
                    for (asset, quote) in prices {
                        result.quotes.entry(asset).or_insert(quote);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        source = client.source_name(),
                        error = %e,
                        "Source failed during aggregation"
                    );
                    result.errors.push(format!("{}: {}", client.source_name(), e));
                }
            }
        }

        for &asset in assets {
            if !result.quotes.contains_key(&asset) {
                result
                    .errors
                    .push(format!("{}: all sources failed", asset.symbol()));
            }
        }

        tracing::debug!(
            success = result.success_count(),
            total = assets.len(),
            sources = ?result.sources_used,
            "Aggregation pass complete"
        );
        result
    }
}
