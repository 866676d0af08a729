//! The item catalog and name lookup.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::store::CatalogStore;
use crate::api::{GameApi, MAX_IDS_PER_REQUEST};
use crate::error::{LookupError, Result};
use crate::model::{Item, ItemFlag, ItemId, Rarity};

const DIR: &str = "items";

/// Facet filters for [`ItemCatalog::search_name`]. Name matching is always
/// case-exact; the facets narrow ties between reskins and stat variants.
#[derive(Debug, Clone, Default)]
pub struct NameQuery {
    pub rarity: Option<Rarity>,
    pub with_flags: Vec<ItemFlag>,
    pub without_flags: Vec<ItemFlag>,
    /// Accept the first match instead of failing when several remain.
    pub allow_multiple: bool,
}

impl NameQuery {
    fn matches(&self, item: &Item) -> bool {
        if self.rarity.is_some_and(|r| item.rarity != r) {
            return false;
        }
        self.with_flags.iter().all(|&f| item.has_flag(f))
            && self.without_flags.iter().all(|&f| !item.has_flag(f))
    }
}

/// Disk-backed item catalog.
pub struct ItemCatalog {
    store: CatalogStore<ItemId, Item>,
    /// Lazily built on the first name search, invalidated on rebuild.
    names: Mutex<Option<HashMap<String, Vec<ItemId>>>>,
}

impl ItemCatalog {
    pub fn open(cache_dir: &Path) -> Result<Self> {
        let store = CatalogStore::open(&cache_dir.join(DIR), "")?;
        Ok(Self {
            store,
            names: Mutex::new(None),
        })
    }

    pub fn get(&self, id: ItemId) -> Result<Option<Arc<Item>>> {
        Ok(self.store.get(&id)?)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.store.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.store.keys().copied()
    }

    /// Drop everything and refill from the API in id chunks of
    /// [`MAX_IDS_PER_REQUEST`]. Safe to retry after a partial failure; the
    /// next attempt starts from empty again.
    pub async fn rebuild(&mut self, api: &dyn GameApi) -> Result<()> {
        self.store.truncate()?;
        *self.names.lock() = None;

        let ids = api.item_ids().await?;
        info!(total = ids.len(), "rebuilding item catalog");
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            for item in api.items(chunk).await? {
                self.store.add(item.id, &item)?;
            }
        }
        debug!(records = self.store.len(), "item catalog rebuilt");
        Ok(())
    }

    /// Resolve an item name to its id, filtered by `query`'s facets.
    ///
    /// More than one surviving match is [`LookupError::AmbiguousName`]
    /// unless `allow_multiple` is set, in which case the lowest id wins.
    pub fn search_name(&self, name: &str, query: &NameQuery) -> Result<ItemId> {
        let mut candidates = self.ids_for_name(name)?;
        candidates.retain(|&id| match self.store.get(&id) {
            Ok(Some(item)) => query.matches(&item),
            _ => false,
        });
        candidates.sort_unstable();

        match candidates.as_slice() {
            [] => Err(LookupError::UnknownName { name: name.into() }.into()),
            [id] => Ok(*id),
            [first, ..] if query.allow_multiple => Ok(*first),
            _ => Err(LookupError::AmbiguousName {
                name: name.into(),
                candidates,
            }
            .into()),
        }
    }

    fn ids_for_name(&self, name: &str) -> Result<Vec<ItemId>> {
        let mut index = self.names.lock();
        if index.is_none() {
            let mut names: HashMap<String, Vec<ItemId>> = HashMap::new();
            for entry in self.store.scan()? {
                match entry {
                    Ok((id, item)) => names.entry(item.name).or_default().push(id),
                    Err(err) => warn!(error = %err, "skipping unreadable item record"),
                }
            }
            debug!(names = names.len(), "built item name index");
            *index = Some(names);
        }
        Ok(index
            .as_ref()
            .and_then(|names| names.get(name))
            .cloned()
            .unwrap_or_default())
    }
}
