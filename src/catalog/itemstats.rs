//! The itemstat catalog. Small and rarely queried; it exists so reports
//! can name the attribute combination on a piece of gear.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use super::store::CatalogStore;
use crate::api::{GameApi, MAX_IDS_PER_REQUEST};
use crate::error::Result;
use crate::model::{ItemStat, ItemStatId};

const DIR: &str = "itemstats";

pub struct ItemStatCatalog {
    store: CatalogStore<ItemStatId, ItemStat>,
}

impl ItemStatCatalog {
    pub fn open(cache_dir: &Path) -> Result<Self> {
        Ok(Self {
            store: CatalogStore::open(&cache_dir.join(DIR), "")?,
        })
    }

    pub fn get(&self, id: ItemStatId) -> Result<Option<Arc<ItemStat>>> {
        Ok(self.store.get(&id)?)
    }

    pub fn contains(&self, id: ItemStatId) -> bool {
        self.store.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub async fn rebuild(&mut self, api: &dyn GameApi) -> Result<()> {
        self.store.truncate()?;

        let ids = api.itemstat_ids().await?;
        info!(total = ids.len(), "rebuilding itemstat catalog");
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            for stat in api.itemstats(chunk).await? {
                self.store.add(stat.id, &stat)?;
            }
        }
        debug!(records = self.store.len(), "itemstat catalog rebuilt");
        Ok(())
    }
}
