//! Test doubles and fixture builders shared by the integration suites.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use tradesmith::api::{GameApi, OrderSide, TransactionScope, MAX_IDS_PER_REQUEST};
use tradesmith::error::{ApiError, Result};
use tradesmith::model::{
    Character, Delivery, Ingredient, InventorySlot, Item, ItemId, ItemKind, ItemStat, ItemStatId,
    Listings, MaterialSlot, PriceQuote, PriceSummary, Rarity, Recipe, RecipeId, Transaction,
    TransactionId, WalletEntry,
};

/// Scripted in-memory [`GameApi`]. Tests fill the public fields, then
/// assert on the call counters to verify caching behavior.
#[derive(Default)]
pub struct FakeApi {
    pub build: Mutex<u64>,
    pub items: Mutex<Vec<Item>>,
    pub recipes: Mutex<Vec<Recipe>>,
    pub itemstats: Mutex<Vec<ItemStat>>,
    pub prices: Mutex<HashMap<ItemId, PriceSummary>>,
    pub listings: Mutex<HashMap<ItemId, Listings>>,
    pub current_orders: Mutex<HashMap<OrderSide, Vec<Transaction>>>,
    /// Newest first, exactly as the endpoint pages.
    pub history: Mutex<HashMap<OrderSide, Vec<Transaction>>>,
    /// When set, history requests fail like a key without the trading
    /// post scope.
    pub history_unavailable: Mutex<bool>,
    /// When set, every current-orders request returns the first full page,
    /// like an upstream that ignores the page parameter.
    pub stuck_current_page: Mutex<bool>,
    pub bank: Mutex<Vec<Option<InventorySlot>>>,
    pub materials: Mutex<Vec<MaterialSlot>>,
    pub wallet: Mutex<Vec<WalletEntry>>,
    pub delivery: Mutex<Delivery>,
    pub characters: Mutex<Vec<Character>>,

    pub build_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
    pub price_calls: AtomicUsize,
    pub transaction_calls: AtomicUsize,
    pub character_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        *api.build.lock() = 100_000;
        api
    }

    fn page(rows: &[Transaction], page: u32) -> Vec<Transaction> {
        rows.chunks(MAX_IDS_PER_REQUEST)
            .nth(page as usize)
            .map(<[Transaction]>::to_vec)
            .unwrap_or_default()
    }
}

#[async_trait]
impl GameApi for FakeApi {
    async fn build_id(&self) -> Result<u64> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        Ok(*self.build.lock())
    }

    async fn item_ids(&self) -> Result<Vec<ItemId>> {
        Ok(self.items.lock().iter().map(|i| i.id).collect())
    }

    async fn items(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .items
            .lock()
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn recipe_ids(&self) -> Result<Vec<RecipeId>> {
        Ok(self.recipes.lock().iter().map(|r| r.id).collect())
    }

    async fn recipes(&self, ids: &[RecipeId]) -> Result<Vec<Recipe>> {
        Ok(self
            .recipes
            .lock()
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn itemstat_ids(&self) -> Result<Vec<ItemStatId>> {
        Ok(self.itemstats.lock().iter().map(|s| s.id).collect())
    }

    async fn itemstats(&self, ids: &[ItemStatId]) -> Result<Vec<ItemStat>> {
        Ok(self
            .itemstats
            .lock()
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    async fn prices(&self, ids: &[ItemId]) -> Result<Vec<PriceSummary>> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        let prices = self.prices.lock();
        Ok(ids.iter().filter_map(|id| prices.get(id).cloned()).collect())
    }

    async fn listings(&self, ids: &[ItemId]) -> Result<Vec<Listings>> {
        let listings = self.listings.lock();
        Ok(ids
            .iter()
            .filter_map(|id| listings.get(id).cloned())
            .collect())
    }

    async fn transactions(
        &self,
        scope: TransactionScope,
        side: OrderSide,
        page: u32,
    ) -> Result<Vec<Transaction>> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        let book = match scope {
            TransactionScope::Current => {
                if *self.stuck_current_page.lock() {
                    let book = self.current_orders.lock();
                    return Ok(book
                        .get(&side)
                        .map(|rows| Self::page(rows, 0))
                        .unwrap_or_default());
                }
                &self.current_orders
            }
            TransactionScope::History => {
                if *self.history_unavailable.lock() {
                    return Err(ApiError::MissingApiKey {
                        endpoint: "commerce/transactions",
                    }
                    .into());
                }
                &self.history
            }
        };
        let book = book.lock();
        Ok(book
            .get(&side)
            .map(|rows| Self::page(rows, page))
            .unwrap_or_default())
    }

    async fn delivery(&self) -> Result<Delivery> {
        Ok(self.delivery.lock().clone())
    }

    async fn bank(&self) -> Result<Vec<Option<InventorySlot>>> {
        Ok(self.bank.lock().clone())
    }

    async fn materials(&self) -> Result<Vec<MaterialSlot>> {
        Ok(self.materials.lock().clone())
    }

    async fn wallet(&self) -> Result<Vec<WalletEntry>> {
        Ok(self.wallet.lock().clone())
    }

    async fn characters(&self) -> Result<Vec<Character>> {
        self.character_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.characters.lock().clone())
    }
}

pub fn item(id: u32, name: &str) -> Item {
    Item {
        id: ItemId(id),
        name: name.into(),
        kind: ItemKind::CraftingMaterial,
        rarity: Rarity::Basic,
        level: 0,
        vendor_value: None,
        flags: vec![],
        details: None,
    }
}

pub fn recipe(id: u32, output: u32, output_count: u32, ingredients: Vec<Ingredient>) -> Recipe {
    Recipe {
        id: RecipeId(id),
        kind: "Refinement".into(),
        output_item_id: ItemId(output),
        output_item_count: output_count,
        min_rating: 0,
        disciplines: vec![],
        ingredients,
        refine_only: false,
    }
}

/// Price summary with the given best bid and offer; zero means that side
/// of the book is empty.
pub fn summary(id: u32, bid: i64, offer: i64) -> PriceSummary {
    let quote = |price: i64| {
        (price > 0).then_some(PriceQuote {
            unit_price: price,
            quantity: 10,
        })
    };
    PriceSummary {
        id: ItemId(id),
        buys: quote(bid),
        sells: quote(offer),
    }
}

pub fn tx(id: u64, item: u32, quantity: i64) -> Transaction {
    Transaction {
        id: TransactionId(id),
        item_id: ItemId(item),
        price: 100,
        quantity,
        created: Utc::now(),
        purchased: Some(Utc::now()),
    }
}
