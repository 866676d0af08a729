//! The disk-backed recipe catalog with its output reverse index.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::CatalogStore;
use crate::api::{GameApi, MAX_IDS_PER_REQUEST};
use crate::error::Result;
use crate::model::{ItemId, Recipe, RecipeId};

const DIR: &str = "recipes";

/// Disk-backed recipe catalog.
///
/// Alongside the store it maintains the reverse index the strategy engine
/// queries constantly: `output_item_id -> recipe ids`. The index is rebuilt
/// by one scan at open and kept current on every `add`.
pub struct RecipeCatalog {
    store: CatalogStore<RecipeId, Recipe>,
    by_output: HashMap<ItemId, Vec<RecipeId>>,
}

impl RecipeCatalog {
    pub fn open(cache_dir: &Path) -> Result<Self> {
        let store = CatalogStore::open(&cache_dir.join(DIR), "")?;
        let by_output = build_output_index(&store)?;
        Ok(Self { store, by_output })
    }

    pub fn get(&self, id: RecipeId) -> Result<Option<Arc<Recipe>>> {
        Ok(self.store.get(&id)?)
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.store.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Recipe ids producing `item`, in ascending id order.
    pub fn search_output(&self, item: ItemId) -> &[RecipeId] {
        self.by_output.get(&item).map_or(&[], Vec::as_slice)
    }

    pub fn add(&mut self, recipe: &Recipe) -> Result<()> {
        self.store.add(recipe.id, recipe)?;
        index_recipe(&mut self.by_output, recipe);
        Ok(())
    }

    /// Drop everything and refill from the API in id chunks of
    /// [`MAX_IDS_PER_REQUEST`]. Idempotent when restarted from empty.
    pub async fn rebuild(&mut self, api: &dyn GameApi) -> Result<()> {
        self.store.truncate()?;
        self.by_output.clear();

        let ids = api.recipe_ids().await?;
        info!(total = ids.len(), "rebuilding recipe catalog");
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            for recipe in api.recipes(chunk).await? {
                self.add(&recipe)?;
            }
        }
        debug!(records = self.store.len(), "recipe catalog rebuilt");
        Ok(())
    }
}

fn build_output_index(
    store: &CatalogStore<RecipeId, Recipe>,
) -> Result<HashMap<ItemId, Vec<RecipeId>>> {
    let mut by_output: HashMap<ItemId, Vec<RecipeId>> = HashMap::new();
    for entry in store.scan()? {
        match entry {
            Ok((_, recipe)) => index_recipe(&mut by_output, &recipe),
            Err(err) => warn!(error = %err, "skipping unreadable recipe record"),
        }
    }
    for ids in by_output.values_mut() {
        ids.sort_unstable();
    }
    Ok(by_output)
}

fn index_recipe(by_output: &mut HashMap<ItemId, Vec<RecipeId>>, recipe: &Recipe) {
    let ids = by_output.entry(recipe.output_item_id).or_default();
    match ids.binary_search(&recipe.id) {
        Ok(_) => {}
        Err(pos) => ids.insert(pos, recipe.id),
    }
}
