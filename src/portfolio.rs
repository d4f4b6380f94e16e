//! Portfolio holdings and fail-soft valuation
//!
//! Holdings are an explicit value owned by the caller; there is no
//! ambient session state. A valuation never aborts because one price
//! is missing - the affected asset is flagged instead.

use crate::{
    aggregator::AggregatedPrices,
    types::{Asset, PriceQuote},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Rejected holding mutation: quantities must be finite and non-negative
#[derive(Debug, Error, PartialEq)]
#[error("Invalid quantity {quantity} for {asset}")]
pub struct InvalidQuantity {
    pub asset: Asset,
    pub quantity: f64,
}

/// User-entered holdings, keyed by asset (one entry per symbol)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    holdings: HashMap<Asset, f64>,
}

impl Portfolio {
    /// Creates an empty portfolio
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo portfolio used by the dashboard's reset action
    pub fn default_demo() -> Self {
        let mut portfolio = Self::new();
        for (asset, quantity) in [
            (Asset::BTC, 0.9997),
            (Asset::ETH, 9.9983),
            (Asset::BNB, 29.5623),
            (Asset::POL, 4986.01),
        ] {
            portfolio.holdings.insert(asset, quantity);
        }
        portfolio
    }

    /// Sets (or overwrites) the quantity held for an asset
    pub fn set_holding(&mut self, asset: Asset, quantity: f64) -> Result<(), InvalidQuantity> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(InvalidQuantity { asset, quantity });
        }
        self.holdings.insert(asset, quantity);
        Ok(())
    }

    /// Removes a holding, returning the previous quantity
    pub fn remove_holding(&mut self, asset: Asset) -> Option<f64> {
        self.holdings.remove(&asset)
    }

    /// Drops every holding
    pub fn clear(&mut self) {
        self.holdings.clear();
    }

    /// Quantity held for an asset; zero when absent
    pub fn quantity(&self, asset: Asset) -> f64 {
        self.holdings.get(&asset).copied().unwrap_or(0.0)
    }

    /// Whether the portfolio holds anything
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Values the portfolio against a price snapshot.
    ///
    /// An asset whose price is missing from the snapshot contributes
    /// zero and appears in the breakdown flagged as unavailable; the
    /// rest of the portfolio is valued normally.
    pub fn valuation(&self, prices: &AggregatedPrices) -> PortfolioValuation {
        let mut holdings = Vec::with_capacity(self.holdings.len());
        let mut unavailable = Vec::new();
        let mut total_usd = 0.0;

        for (&asset, &quantity) in &self.holdings {
            let price = prices.quote(asset).cloned();
            let value_usd = match &price {
                Some(quote) => quantity * quote.price_usd,
                None => {
                    unavailable.push(asset);
                    0.0
                }
            };
            total_usd += value_usd;

            holdings.push(HoldingValue {
                asset,
                quantity,
                price,
                value_usd,
                allocation_percent: 0.0,
            });
        }

        if total_usd > 0.0 {
            for holding in &mut holdings {
                holding.allocation_percent = holding.value_usd / total_usd * 100.0;
            }
        }
        holdings.sort_by(|a, b| {
            b.value_usd
                .partial_cmp(&a.value_usd)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        unavailable.sort_by_key(|a| a.symbol());

        PortfolioValuation {
            total_usd,
            holdings,
            unavailable,
        }
    }
}

/// One asset's contribution to a valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingValue {
    pub asset: Asset,
    pub quantity: f64,

    /// The quote used, or `None` when no source served a price
    pub price: Option<PriceQuote>,

    /// Quantity times price; zero when the price is unavailable
    pub value_usd: f64,

    /// Share of the priced total, in percent
    pub allocation_percent: f64,
}

impl HoldingValue {
    /// Whether a price backed this row
    pub fn price_available(&self) -> bool {
        self.price.is_some()
    }
}

/// Result of valuing a portfolio against a price snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Total value across every priced holding
    pub total_usd: f64,

    /// Per-asset breakdown, largest position first
    pub holdings: Vec<HoldingValue>,

    /// Assets that could not be priced
    pub unavailable: Vec<Asset>,
}

impl std::fmt::Display for PortfolioValuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:<6} {:>14} {:>14} {:>14} {:>7}",
            "ASSET", "QUANTITY", "PRICE", "VALUE", "ALLOC"
        )?;
        for holding in &self.holdings {
            match &holding.price {
                Some(quote) => writeln!(
                    f,
                    "{:<6} {:>14.4} {:>14.2} {:>14.2} {:>6.1}%",
                    holding.asset,
                    holding.quantity,
                    quote.price_usd,
                    holding.value_usd,
                    holding.allocation_percent
                )?,
                None => writeln!(
                    f,
                    "{:<6} {:>14.4} {:>14} {:>14.2} {:>7}",
                    holding.asset, holding.quantity, "unavailable", 0.0, "-"
                )?,
            }
        }
        write!(f, "{:<6} {:>14} {:>14} {:>14.2}", "TOTAL", "", "", self.total_usd)
    }
}
