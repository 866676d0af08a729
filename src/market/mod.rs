//! Live trading-post data behind short-lived disk caches.
//!
//! The [`MarketOracle`] answers price, depth and open-order questions from
//! append-only stores under `trading_post/`, refetching lazily when the
//! 30-minute TTL lapses. The [`HistoryLedger`] accumulates the account's
//! filled transactions incrementally across runs.

mod history;
mod oracle;
mod vendor;

pub use history::HistoryLedger;
pub use oracle::{MarketOracle, MARKET_TTL};
pub use vendor::vendor_prices;
