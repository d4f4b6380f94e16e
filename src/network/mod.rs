//! Clients for network statistics and market sentiment endpoints
//!
//! Each client covers one external API and parses its own response
//! schema; none depends on another. The presentation layer decides how
//! to degrade when any one of them is unavailable.

pub mod bitfinex;
pub mod coindesk;
pub mod mempool;
pub mod sentiment;

pub use bitfinex::BitfinexClient;
pub use coindesk::CoindeskClient;
pub use mempool::MempoolClient;
pub use sentiment::SentimentClient;
