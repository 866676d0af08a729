//! Item catalog records.

use serde::{Deserialize, Serialize};

use crate::coin::{min_sale_price, Coin};

/// Unique identifier for an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for an itemstat (attribute combination) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemStatId(pub u32);

impl std::fmt::Display for ItemStatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item rarity tiers, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Junk,
    Basic,
    Fine,
    Masterwork,
    Rare,
    Exotic,
    Ascended,
    Legendary,
}

/// Top-level item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Armor,
    Back,
    Bag,
    Consumable,
    Container,
    CraftingMaterial,
    Gathering,
    Gizmo,
    Key,
    MiniPet,
    Tool,
    Trinket,
    Trophy,
    UpgradeComponent,
    Weapon,
    #[serde(other)]
    Other,
}

/// Item behavior flags. Only the ones the planner cares about are named;
/// the rest round-trip as `Other` and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemFlag {
    NoSell,
    NoSalvage,
    AccountBound,
    SoulbindOnAcquire,
    #[serde(other)]
    Other,
}

/// Nested type-specific detail block. Only the subtype is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ItemDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

/// An item catalog record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub rarity: Rarity,
    #[serde(default)]
    pub level: u16,
    /// Coin an NPC vendor pays for this item, if it can be vendored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<ItemFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ItemDetails>,
}

impl Item {
    pub fn has_flag(&self, flag: ItemFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Whether the trading post accepts listings for this item.
    pub fn sellable(&self) -> bool {
        !self.has_flag(ItemFlag::NoSell) && !self.has_flag(ItemFlag::AccountBound)
    }

    /// The platform's minimum listing price, when the item is sellable
    /// and has a vendor value to anchor it.
    pub fn min_sale_price(&self) -> Option<Coin> {
        if !self.sellable() {
            return None;
        }
        self.vendor_value.map(min_sale_price)
    }
}

/// An itemstat record: a named attribute combination referenced by gear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStat {
    pub id: ItemStatId,
    pub name: String,
}
