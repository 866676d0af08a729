//! The market oracle: cached prices, order books and open orders.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::history::HistoryLedger;
use crate::api::{GameApi, OrderSide, TransactionScope, MAX_IDS_PER_REQUEST};
use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::model::{ItemId, Listings, PriceSummary, Transaction};

const DIR: &str = "trading_post";
const PRICES_PREFIX: &str = "";
const LISTINGS_PREFIX: &str = "listings_";

/// How long cached prices and order books stay servable.
pub const MARKET_TTL: Duration = Duration::from_secs(30 * 60);

/// Concurrent upstream calls during a bulk prefetch.
const PREFETCH_WORKERS: usize = 4;

/// Hard stop for one open-orders walk; 500 full pages is far beyond any
/// real account and bounds the damage from a misbehaving upstream.
const MAX_PAGES: u32 = 500;

/// The account's open orders on one side of the book.
#[derive(Debug, Clone, Default)]
pub struct PendingOrders {
    pub orders: Vec<Transaction>,
    /// Total open quantity per item.
    pub quantities: HashMap<ItemId, i64>,
}

/// Cached access to live trading-post data and the account's transaction
/// history.
///
/// Price and listing stores cache *nulls* too: an item the post has never
/// listed is recorded as `None` so repeated queries stay local. Both stores
/// expire [`MARKET_TTL`] after their last write; expired files are wiped at
/// open and refilled lazily.
pub struct MarketOracle {
    api: Arc<dyn GameApi>,
    dir: PathBuf,
    prices: Mutex<CatalogStore<ItemId, Option<PriceSummary>>>,
    listings: Mutex<CatalogStore<ItemId, Option<Listings>>>,
    bought: HistoryLedger,
    sold: HistoryLedger,
}

impl MarketOracle {
    /// Open the oracle under `cache_dir`. With `offline` set the TTL check
    /// is suppressed and stale data is served as-is.
    pub fn open(cache_dir: &Path, api: Arc<dyn GameApi>, offline: bool) -> Result<Self> {
        let dir = cache_dir.join(DIR);

        if !offline {
            for prefix in [PRICES_PREFIX, LISTINGS_PREFIX] {
                let age = CatalogStore::<ItemId, ()>::last_write_age(&dir, prefix);
                if age.is_some_and(|age| age > MARKET_TTL) {
                    info!(prefix, age_secs = age.map(|a| a.as_secs()), "market cache expired, wiping");
                    CatalogStore::<ItemId, ()>::wipe(&dir, prefix)?;
                }
            }
        }

        Ok(Self {
            api,
            prices: Mutex::new(CatalogStore::open(&dir, PRICES_PREFIX)?),
            listings: Mutex::new(CatalogStore::open(&dir, LISTINGS_PREFIX)?),
            bought: HistoryLedger::open(&dir, OrderSide::Buys)?,
            sold: HistoryLedger::open(&dir, OrderSide::Sells)?,
            dir,
        })
    }

    /// Drop the price and listing caches so the next query refetches.
    /// The history ledgers are incremental and never need invalidation.
    pub fn invalidate(&self) -> Result<()> {
        self.prices.lock().truncate()?;
        self.listings.lock().truncate()?;
        debug!(dir = %self.dir.display(), "market caches invalidated");
        Ok(())
    }

    /// Price summary for one item; `None` when the post has never listed it.
    pub async fn price(&self, item: ItemId) -> Result<Option<PriceSummary>> {
        Ok(self.prices_multi(&[item]).await?.remove(&item))
    }

    /// Price summaries for many items. Cached entries are served locally;
    /// the rest are fetched in batches of [`MAX_IDS_PER_REQUEST`]. Items
    /// absent from the result have no trading-post presence.
    pub async fn prices_multi(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, PriceSummary>> {
        let missing = self.missing_from(&self.prices, ids);
        for chunk in missing.chunks(MAX_IDS_PER_REQUEST) {
            let rows = self.api.prices(chunk).await?;
            let mut store = self.prices.lock();
            let mut returned = BTreeSet::new();
            for row in rows {
                returned.insert(row.id);
                store.add(row.id, &Some(row))?;
            }
            for &id in chunk.iter().filter(|id| !returned.contains(id)) {
                store.add(id, &None)?;
            }
        }

        let store = self.prices.lock();
        let mut out = HashMap::new();
        for &id in ids {
            if let Some(cached) = store.get(&id)? {
                if let Some(summary) = cached.as_ref() {
                    out.insert(id, summary.clone());
                }
            }
        }
        Ok(out)
    }

    /// Full order book for one item.
    pub async fn listings(&self, item: ItemId) -> Result<Option<Listings>> {
        Ok(self.listings_multi(&[item]).await?.remove(&item))
    }

    /// Full order books for many items; same caching discipline as
    /// [`Self::prices_multi`].
    pub async fn listings_multi(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, Listings>> {
        let missing = self.missing_from(&self.listings, ids);
        for chunk in missing.chunks(MAX_IDS_PER_REQUEST) {
            let rows = self.api.listings(chunk).await?;
            let mut store = self.listings.lock();
            let mut returned = BTreeSet::new();
            for row in rows {
                returned.insert(row.id);
                store.add(row.id, &Some(row))?;
            }
            for &id in chunk.iter().filter(|id| !returned.contains(id)) {
                store.add(id, &None)?;
            }
        }

        let store = self.listings.lock();
        let mut out = HashMap::new();
        for &id in ids {
            if let Some(cached) = store.get(&id)? {
                if let Some(book) = cached.as_ref() {
                    out.insert(id, book.clone());
                }
            }
        }
        Ok(out)
    }

    /// Warm the price cache for `ids` with a small worker pool. Fetches run
    /// concurrently; each batch's writes land under the store lock.
    pub async fn prefetch_prices(&self, ids: &[ItemId]) -> Result<()> {
        let missing = self.missing_from(&self.prices, ids);
        if missing.is_empty() {
            return Ok(());
        }
        debug!(items = missing.len(), "prefetching prices");

        let api = &self.api;
        let mut batches = stream::iter(
            missing
                .chunks(MAX_IDS_PER_REQUEST)
                .map(|chunk| async move { (chunk, api.prices(chunk).await) }),
        )
        .buffer_unordered(PREFETCH_WORKERS);

        while let Some((chunk, rows)) = batches.next().await {
            let rows = rows?;
            let mut store = self.prices.lock();
            let mut returned = BTreeSet::new();
            for row in rows {
                returned.insert(row.id);
                store.add(row.id, &Some(row))?;
            }
            for &id in chunk.iter().filter(|id| !returned.contains(id)) {
                store.add(id, &None)?;
            }
        }
        Ok(())
    }

    /// Open buy orders awaiting fills.
    pub async fn pending_buys(&self) -> Result<PendingOrders> {
        self.pending(OrderSide::Buys).await
    }

    /// Active sell listings.
    pub async fn pending_sells(&self) -> Result<PendingOrders> {
        self.pending(OrderSide::Sells).await
    }

    async fn pending(&self, side: OrderSide) -> Result<PendingOrders> {
        let mut pending = PendingOrders::default();
        for page in 0..MAX_PAGES {
            let rows = self
                .api
                .transactions(TransactionScope::Current, side, page)
                .await?;
            let last_page = rows.len() < MAX_IDS_PER_REQUEST;
            for tx in rows {
                *pending.quantities.entry(tx.item_id).or_default() += tx.quantity;
                pending.orders.push(tx);
            }
            if last_page {
                break;
            }
        }
        Ok(pending)
    }

    /// Cumulative quantity bought per item, across all time.
    pub async fn total_bought(&self) -> Result<HashMap<ItemId, i64>> {
        self.bought.update(self.api.as_ref()).await
    }

    /// Cumulative quantity sold per item, across all time.
    pub async fn total_sold(&self) -> Result<HashMap<ItemId, i64>> {
        self.sold.update(self.api.as_ref()).await
    }

    /// Deduplicated ids not yet present in `store`, in ascending order.
    fn missing_from<V>(
        &self,
        store: &Mutex<CatalogStore<ItemId, Option<V>>>,
        ids: &[ItemId],
    ) -> Vec<ItemId>
    where
        V: serde::Serialize + serde::de::DeserializeOwned,
    {
        let store = store.lock();
        let unique: BTreeSet<ItemId> = ids.iter().copied().collect();
        unique.into_iter().filter(|id| !store.contains(id)).collect()
    }
}
