//! Game REST API surface.
//!
//! [`GameApi`] abstracts the official endpoints the advisor reads: catalog
//! dumps (items, recipes, itemstats), commerce data (prices, listings,
//! transactions) and account state (bank, materials, wallet, characters).
//! The production implementation is [`HttpApi`]; tests swap in a scripted
//! double.

mod http;

pub use http::{HttpApi, DEFAULT_API_URL};

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    Character, Delivery, InventorySlot, Item, ItemId, ItemStat, ItemStatId, Listings,
    MaterialSlot, PriceSummary, Recipe, RecipeId, Transaction, WalletEntry,
};

/// Hard server-side cap on ids per bulk request and rows per transaction
/// page. Callers chunk their id lists to this size.
pub const MAX_IDS_PER_REQUEST: usize = 100;

/// Which transaction book to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionScope {
    /// Orders still open on the trading post.
    Current,
    /// Orders that have filled.
    History,
}

impl fmt::Display for TransactionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("current"),
            Self::History => f.write_str("history"),
        }
    }
}

/// Which side of the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSide {
    Buys,
    Sells,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buys => f.write_str("buys"),
            Self::Sells => f.write_str("sells"),
        }
    }
}

/// Read access to the game's REST API.
///
/// Bulk lookups (`items`, `recipes`, `prices`, ...) take at most
/// [`MAX_IDS_PER_REQUEST`] ids and return only the entries the server
/// knows about; ids it does not recognize are silently dropped from the
/// response, so callers must diff against the request to spot misses.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Current game build number.
    async fn build_id(&self) -> Result<u64>;

    /// Every item id the API serves.
    async fn item_ids(&self) -> Result<Vec<ItemId>>;

    /// Item records for up to [`MAX_IDS_PER_REQUEST`] ids.
    async fn items(&self, ids: &[ItemId]) -> Result<Vec<Item>>;

    /// Every recipe id the API serves.
    async fn recipe_ids(&self) -> Result<Vec<RecipeId>>;

    /// Recipe records for up to [`MAX_IDS_PER_REQUEST`] ids.
    async fn recipes(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>>;

    /// Every itemstat id the API serves.
    async fn itemstat_ids(&self) -> Result<Vec<ItemStatId>>;

    /// Itemstat records for up to [`MAX_IDS_PER_REQUEST`] ids.
    async fn itemstats(&self, ids: &[ItemStatId]) -> Result<Vec<ItemStat>>;

    /// Price summaries for items currently listed on the trading post.
    /// Unlisted ids are absent from the result.
    async fn prices(&self, ids: &[ItemId]) -> Result<Vec<PriceSummary>>;

    /// Full order books for items currently listed on the trading post.
    /// Unlisted ids are absent from the result.
    async fn listings(&self, ids: &[ItemId]) -> Result<Vec<Listings>>;

    /// One page of the account's transactions, newest first. Pages hold
    /// up to [`MAX_IDS_PER_REQUEST`] rows; a short page is the last one.
    async fn transactions(
        &self,
        scope: TransactionScope,
        side: OrderSide,
        page: u32,
    ) -> Result<Vec<Transaction>>;

    /// Items and coins waiting at the trading post pickup point.
    async fn delivery(&self) -> Result<Delivery>;

    /// Account bank tabs; empty slots are `None`.
    async fn bank(&self) -> Result<Vec<Option<InventorySlot>>>;

    /// Account material storage.
    async fn materials(&self) -> Result<Vec<MaterialSlot>>;

    /// Account wallet balances.
    async fn wallet(&self) -> Result<Vec<WalletEntry>>;

    /// All characters on the account, with crafting disciplines and bags.
    async fn characters(&self) -> Result<Vec<Character>>;
}
