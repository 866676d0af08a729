//! The currency ↔ virtual-item bijection.
//!
//! A handful of wallet currencies participate in crafting: recipes list them
//! as ingredients and the planner must price and budget them like items. Each
//! such currency gets a stable virtual item id so the rest of the system can
//! stay in item-space; the projection only happens at the wallet boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// Unique identifier for a wallet currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyId(pub u32);

impl std::fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Virtual item ids are `VIRTUAL_ITEM_BASE + currency id`, far above the
/// real catalog's id space.
pub const VIRTUAL_ITEM_BASE: u32 = 9_000_000;

const KARMA: CurrencyId = CurrencyId(2);
const SPIRIT_SHARD: CurrencyId = CurrencyId(23);
const RESEARCH_NOTE: CurrencyId = CurrencyId(61);
const IMPERIAL_FAVOR: CurrencyId = CurrencyId(68);

/// Two-way lookup between crafting-relevant currencies and their virtual
/// item ids.
#[derive(Debug, Clone)]
pub struct CurrencyTable {
    names: HashMap<CurrencyId, &'static str>,
    by_item: HashMap<ItemId, CurrencyId>,
}

impl CurrencyTable {
    fn with_entries(entries: &[(CurrencyId, &'static str)]) -> Self {
        let mut names = HashMap::new();
        let mut by_item = HashMap::new();
        for &(id, name) in entries {
            names.insert(id, name);
            by_item.insert(Self::virtual_item(id), id);
        }
        Self { names, by_item }
    }

    /// The virtual item id assigned to a currency.
    pub const fn virtual_item(currency: CurrencyId) -> ItemId {
        ItemId(VIRTUAL_ITEM_BASE + currency.0)
    }

    /// Virtual item for a currency, `None` when the currency does not
    /// participate in crafting.
    pub fn item_for(&self, currency: CurrencyId) -> Option<ItemId> {
        if self.names.contains_key(&currency) {
            Some(Self::virtual_item(currency))
        } else {
            None
        }
    }

    /// Currency behind a virtual item id, `None` for real items.
    pub fn currency_for(&self, item: ItemId) -> Option<CurrencyId> {
        self.by_item.get(&item).copied()
    }

    pub fn is_virtual(&self, item: ItemId) -> bool {
        self.by_item.contains_key(&item)
    }

    /// Display name for a currency or its virtual item.
    pub fn name(&self, currency: CurrencyId) -> Option<&'static str> {
        self.names.get(&currency).copied()
    }

    /// The research-note virtual item, which the engine special-cases for
    /// bundle strategies.
    pub fn research_note_item(&self) -> ItemId {
        Self::virtual_item(RESEARCH_NOTE)
    }

    pub fn spirit_shard_item(&self) -> ItemId {
        Self::virtual_item(SPIRIT_SHARD)
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::with_entries(&[
            (KARMA, "Karma"),
            (SPIRIT_SHARD, "Spirit Shard"),
            (RESEARCH_NOTE, "Research Note"),
            (IMPERIAL_FAVOR, "Imperial Favor"),
        ])
    }
}
