//! One-shot snapshot of every dashboard view, printed to stdout.
//!
//! Run with: cargo run --example dashboard

use crypto_dashboard_sdk::indicators::{closes, rsi, sma};
use crypto_dashboard_sdk::{Asset, DashboardService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let service = DashboardService::new()?;
    println!("Price sources: {:?}\n", service.source_names());

    println!("== Spot prices ==");
    match service.crypto_prices().await {
        Ok(cached) => {
            for &asset in Asset::all() {
                match cached.value.quote(asset) {
                    Some(quote) => {
                        println!("{:<4} ${:>12.2}  via {}", asset, quote.price_usd, quote.source)
                    }
                    None => println!("{:<4} {:>13}", asset, "unavailable"),
                }
            }
            if cached.stale {
                println!("(stale snapshot served after a failed refresh)");
            }
        }
        Err(e) => println!("prices unavailable: {e}"),
    }

    println!("\n== Bitcoin spot (CoinDesk, CoinGecko fallback) ==");
    match service.btc_price().await {
        Ok(cached) => println!(
            "BTC ${:.2} via {} at {}",
            cached.value.price_usd, cached.value.source, cached.value.fetched_at
        ),
        Err(e) => println!("unavailable: {e}"),
    }

    println!("\n== Recommended fees ==");
    match service.mempool_fees().await {
        Ok(cached) => println!("{}", cached.value),
        Err(e) => println!("unavailable: {e}"),
    }

    println!("\n== Difficulty adjustment ==");
    match service.difficulty_adjustment().await {
        Ok(cached) => println!(
            "{:.1}% through the epoch, projected change {:+.2}%, {} blocks remaining",
            cached.value.progress_percent,
            cached.value.difficulty_change,
            cached.value.remaining_blocks
        ),
        Err(e) => println!("unavailable: {e}"),
    }

    println!("\n== Sentiment ==");
    match service.fear_greed().await {
        Ok(cached) => println!("{}", cached.value),
        Err(e) => println!("unavailable: {e}"),
    }

    println!("\n== Technical indicators (weekly BTC candles) ==");
    match service.btc_ohlc_history().await {
        Ok(cached) => {
            let series = closes(&cached.value);
            let last_rsi = rsi(&series, 14).last().copied().flatten();
            let last_ma20 = sma(&series, 20).last().copied().flatten();
            println!("candles: {}", cached.value.len());
            match last_rsi {
                Some(v) => println!("RSI(14): {v:.1}"),
                None => println!("RSI(14): insufficient data"),
            }
            match last_ma20 {
                Some(v) => println!("MA20: ${v:.2}"),
                None => println!("MA20: insufficient data"),
            }
        }
        Err(e) => println!("unavailable: {e}"),
    }

    println!("\n== Health ==");
    let health = service.health_check().await;
    println!("{:?}: {}", health.status, health.message.unwrap_or_default());

    println!("\n== Recent API calls ==");
    for record in service.diagnostics().recent(10).await {
        println!(
            "{} {:<14} {:<28} {:>7.1}ms {:?}",
            record.timestamp.format("%H:%M:%S"),
            record.source,
            record.endpoint,
            record.latency_ms,
            record.outcome
        );
    }

    Ok(())
}
