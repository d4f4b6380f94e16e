//! Exchange client implementations

pub mod binance;
pub mod coinbase;
pub mod coingecko;
pub mod kucoin;

pub use binance::BinanceClient;
pub use coinbase::CoinbaseClient;
pub use coingecko::CoinGeckoClient;
pub use kucoin::KuCoinClient;
