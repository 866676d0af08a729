//! Incremental ledger of the account's filled trading-post orders.
//!
//! The history endpoint pages newest-first and only ever grows, so each
//! run walks pages until it meets a transaction it already has on disk.
//! New rows can land upstream *during* the walk, shifting page boundaries
//! and repeating ids on later pages; repeats within one walk are skipped
//! rather than treated as the stop marker.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::{GameApi, OrderSide, TransactionScope, MAX_IDS_PER_REQUEST};
use crate::catalog::CatalogStore;
use crate::error::{Error, Result};
use crate::model::{ItemId, Transaction, TransactionId};

/// Hard stop for one walk; at 100 rows per page this is well past any
/// plausible backlog of unseen fills.
const MAX_PAGES: u32 = 500;

/// Cumulative per-item totals for one side of the filled-order history.
pub struct HistoryLedger {
    side: OrderSide,
    store: Mutex<CatalogStore<TransactionId, Transaction>>,
    totals_path: PathBuf,
    totals: Mutex<HashMap<ItemId, i64>>,
}

impl HistoryLedger {
    /// Open the ledger under `dir` (the `trading_post/` cache directory).
    pub fn open(dir: &Path, side: OrderSide) -> Result<Self> {
        let prefix = match side {
            OrderSide::Buys => "history_bought_",
            OrderSide::Sells => "history_sold_",
        };
        let store = CatalogStore::open(dir, prefix)?;
        let totals_path = dir.join(format!("{prefix}totals.json"));
        let totals = load_totals(&totals_path)?;

        Ok(Self {
            side,
            store: Mutex::new(store),
            totals_path,
            totals: Mutex::new(totals),
        })
    }

    /// Pull any fills newer than the stored prefix, then return cumulative
    /// quantities per item.
    ///
    /// A 4xx on the endpoint (no key, or the key lacks the tradingpost
    /// scope) leaves the ledger as-is; whatever accumulated in earlier runs
    /// still counts.
    pub async fn update(&self, api: &dyn GameApi) -> Result<HashMap<ItemId, i64>> {
        let fresh = match self.walk(api).await {
            Ok(fresh) => fresh,
            Err(Error::Api(err)) if err.is_client_error() => {
                warn!(side = %self.side, error = %err, "history unavailable, serving stored totals");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut totals = self.totals.lock();
        if !fresh.is_empty() {
            let mut store = self.store.lock();
            for tx in &fresh {
                store.add(tx.id, tx)?;
                *totals.entry(tx.item_id).or_default() += tx.quantity;
            }
            save_totals(&self.totals_path, &totals)?;
            debug!(side = %self.side, new = fresh.len(), "history ledger advanced");
        }
        Ok(totals.clone())
    }

    /// Page newest-first until the first transaction already on disk.
    async fn walk(&self, api: &dyn GameApi) -> Result<Vec<Transaction>> {
        let mut fresh: Vec<Transaction> = Vec::new();
        let mut seen_this_walk = std::collections::HashSet::new();

        'pages: for page in 0..MAX_PAGES {
            let rows = api
                .transactions(TransactionScope::History, self.side, page)
                .await?;
            let last_page = rows.len() < MAX_IDS_PER_REQUEST;

            for tx in rows {
                if self.store.lock().contains(&tx.id) {
                    break 'pages;
                }
                // A row that slid onto a later page mid-walk.
                if !seen_this_walk.insert(tx.id) {
                    continue;
                }
                fresh.push(tx);
            }

            if last_page {
                break;
            }
        }
        Ok(fresh)
    }

    /// Cumulative quantities without touching the network.
    pub fn totals(&self) -> HashMap<ItemId, i64> {
        self.totals.lock().clone()
    }
}

/// Totals are `[item_id, quantity]` pairs, sorted by id, written whole via
/// temp-file + rename so a crash never leaves a half-written file.
fn load_totals(path: &Path) -> Result<HashMap<ItemId, i64>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => return Err(err.into()),
    };
    let pairs: Vec<(ItemId, i64)> = serde_json::from_str(&text)?;
    Ok(pairs.into_iter().collect())
}

fn save_totals(path: &Path, totals: &HashMap<ItemId, i64>) -> Result<()> {
    let mut pairs: Vec<(ItemId, i64)> = totals.iter().map(|(&k, &v)| (k, v)).collect();
    pairs.sort_unstable_by_key(|&(id, _)| id);

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string(&pairs)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
