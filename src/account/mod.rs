//! Account snapshot assembly.
//!
//! One owned-quantity map summed from every character's bags, material
//! storage, the bank, and the trading-post delivery box, with wallet
//! balances projected through the currency↔item bijection. Snapshots are
//! ephemeral; only the character list is cached on disk, since it changes
//! rarely and is the most expensive account fetch.

use std::path::Path;

use tracing::debug;

use crate::api::GameApi;
use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::model::{Character, CraftingProfile, CurrencyTable, Inventory};

const DIR: &str = "characters";

/// Disk cache of the account's characters, rebuilt per game build.
pub struct CharacterCache {
    store: CatalogStore<String, Character>,
}

impl CharacterCache {
    pub fn open(cache_dir: &Path) -> Result<Self> {
        Ok(Self {
            store: CatalogStore::open(&cache_dir.join(DIR), "")?,
        })
    }

    /// All cached characters, fetching and filling the cache when empty.
    pub async fn all(&mut self, api: &dyn GameApi) -> Result<Vec<Character>> {
        if self.store.is_empty() {
            self.rebuild(api).await?;
        }
        let mut characters = Vec::with_capacity(self.store.len());
        for entry in self.store.scan()? {
            characters.push(entry?.1);
        }
        Ok(characters)
    }

    pub async fn rebuild(&mut self, api: &dyn GameApi) -> Result<()> {
        self.store.truncate()?;
        for character in api.characters().await? {
            self.store.add(character.name.clone(), &character)?;
        }
        debug!(characters = self.store.len(), "character cache rebuilt");
        Ok(())
    }
}

/// Everything the planner needs to know about the account right now.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    /// Owned quantities, wallet currencies included as virtual items.
    pub inventory: Inventory,
    /// Best crafting rating per discipline across all characters.
    pub crafting: CraftingProfile,
}

impl AccountSnapshot {
    /// Assemble a snapshot from the live account endpoints. Absent entries,
    /// zero counts and null slots contribute nothing.
    pub async fn assemble(
        api: &dyn GameApi,
        characters: &mut CharacterCache,
        currencies: &CurrencyTable,
    ) -> Result<Self> {
        let mut inventory = Inventory::new();

        let characters = characters.all(api).await?;
        let mut carried = std::collections::HashMap::new();
        for character in &characters {
            character.carried_into(&mut carried);
        }
        for (item, count) in carried {
            inventory.add(item, count);
        }

        for slot in api.materials().await? {
            if slot.count > 0 {
                inventory.add(slot.id, slot.count);
            }
        }

        for slot in api.bank().await?.into_iter().flatten() {
            if slot.count > 0 {
                inventory.add(slot.id, slot.count);
            }
        }

        for slot in &api.delivery().await?.items {
            if slot.count > 0 {
                inventory.add(slot.id, slot.count);
            }
        }

        // Wallet balances become items only when the currency participates
        // in crafting; the rest are invisible to planning.
        for entry in api.wallet().await? {
            if entry.value > 0 {
                if let Some(item) = currencies.item_for(entry.id) {
                    inventory.add(item, entry.value);
                }
            }
        }

        let crafting = CraftingProfile::from_characters(&characters);
        debug!(
            items = inventory.len(),
            characters = characters.len(),
            "account snapshot assembled"
        );

        Ok(Self {
            inventory,
            crafting,
        })
    }
}
