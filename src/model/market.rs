//! Trading-post wire types: price summaries, order-book depth, transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::ItemId;
use crate::coin::{coin, Coin};

/// Best price on one side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PriceQuote {
    pub unit_price: i64,
    pub quantity: i64,
}

/// Per-item price summary: highest buy order and lowest sell offer.
/// Either side may be empty (quantity zero) on thin markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSummary {
    pub id: ItemId,
    #[serde(default)]
    pub buys: Option<PriceQuote>,
    #[serde(default)]
    pub sells: Option<PriceQuote>,
}

impl PriceSummary {
    /// Highest standing buy order, when one exists.
    pub fn best_bid(&self) -> Option<Coin> {
        self.buys
            .filter(|q| q.quantity > 0 && q.unit_price > 0)
            .map(|q| coin(q.unit_price))
    }

    /// Lowest standing sell offer, when one exists. This is the cost of
    /// acquiring the item immediately.
    pub fn best_offer(&self) -> Option<Coin> {
        self.sells
            .filter(|q| q.quantity > 0 && q.unit_price > 0)
            .map(|q| coin(q.unit_price))
    }
}

/// One depth level of the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferLevel {
    /// Number of distinct listings at this price.
    #[serde(default)]
    pub listings: i64,
    pub unit_price: i64,
    pub quantity: i64,
}

/// Full order book for one item, best prices first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listings {
    pub id: ItemId,
    #[serde(default)]
    pub buys: Vec<OfferLevel>,
    #[serde(default)]
    pub sells: Vec<OfferLevel>,
}

/// Unique identifier for a trading-post transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One order from the account's trading-post history or open-order list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub item_id: ItemId,
    /// Unit price in copper.
    pub price: i64,
    pub quantity: i64,
    pub created: DateTime<Utc>,
    /// Fill timestamp; open orders have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased: Option<DateTime<Utc>>,
}
