//! Values the demo portfolio against live aggregated prices.
//!
//! Run with: cargo run --example portfolio

use crypto_dashboard_sdk::{DashboardService, Portfolio};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let service = DashboardService::new()?;
    let portfolio = Portfolio::default_demo();

    let valuation = service.portfolio_valuation(&portfolio).await;
    println!("{valuation}");

    if !valuation.unavailable.is_empty() {
        println!(
            "\nNo price could be obtained for: {}",
            valuation
                .unavailable
                .iter()
                .map(|a| a.symbol())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    Ok(())
}
