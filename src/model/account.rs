//! Account and character documents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::currency::CurrencyId;
use super::item::ItemId;
use super::recipe::{Discipline, Recipe};

/// A stack of items in a bag, bank, or delivery-box slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InventorySlot {
    pub id: ItemId,
    pub count: i64,
}

/// One material-storage slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaterialSlot {
    pub id: ItemId,
    #[serde(default)]
    pub category: u32,
    pub count: i64,
}

/// One wallet line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: CurrencyId,
    pub value: i64,
}

/// Items and coin waiting in the trading-post delivery box.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Delivery {
    #[serde(default)]
    pub coins: i64,
    #[serde(default)]
    pub items: Vec<InventorySlot>,
}

/// An equipped bag and its contents. Empty slots are `null` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bag {
    pub id: ItemId,
    pub size: u32,
    #[serde(default)]
    pub inventory: Vec<Option<InventorySlot>>,
}

/// A character's training in one discipline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterCrafting {
    pub discipline: Discipline,
    pub rating: u32,
    #[serde(default)]
    pub active: bool,
}

/// The slice of a character document the advisor needs: carried items and
/// crafting training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub crafting: Vec<CharacterCrafting>,
    /// Empty bag slots are `null` on the wire.
    #[serde(default)]
    pub bags: Vec<Option<Bag>>,
}

impl Character {
    /// Sum the character's carried items into `out`.
    pub fn carried_into(&self, out: &mut HashMap<ItemId, i64>) {
        for slot in self
            .bags
            .iter()
            .flatten()
            .flat_map(|bag| bag.inventory.iter())
            .flatten()
        {
            if slot.count > 0 {
                *out.entry(slot.id).or_default() += slot.count;
            }
        }
    }
}

/// Best crafting rating per discipline across the whole account.
#[derive(Debug, Clone, Default)]
pub struct CraftingProfile {
    ratings: HashMap<Discipline, u32>,
}

impl CraftingProfile {
    pub fn from_characters<'a>(characters: impl IntoIterator<Item = &'a Character>) -> Self {
        let mut ratings: HashMap<Discipline, u32> = HashMap::new();
        for character in characters {
            for craft in &character.crafting {
                let entry = ratings.entry(craft.discipline).or_default();
                *entry = (*entry).max(craft.rating);
            }
        }
        Self { ratings }
    }

    pub fn rating(&self, discipline: Discipline) -> u32 {
        self.ratings.get(&discipline).copied().unwrap_or(0)
    }

    /// Default craftability check: some *trained* discipline on the account
    /// meets the recipe's minimum rating. Recipes with no discipline list
    /// (mystic-forge conversions) need no crafting station at all.
    pub fn can_craft(&self, recipe: &Recipe) -> bool {
        if recipe.disciplines.is_empty() {
            return true;
        }
        recipe
            .disciplines
            .iter()
            .any(|d| self.ratings.get(d).is_some_and(|&r| r >= recipe.min_rating))
    }

    #[cfg(test)]
    pub fn with_rating(discipline: Discipline, rating: u32) -> Self {
        let mut ratings = HashMap::new();
        ratings.insert(discipline, rating);
        Self { ratings }
    }
}
