//! Wire and domain types shared across the crate.
//!
//! The catalog stores persist these exactly as serialized here, so the
//! serde shapes double as the on-disk record format.

mod account;
mod currency;
mod inventory;
mod item;
mod market;
mod recipe;

pub use account::{
    Bag, Character, CharacterCrafting, CraftingProfile, Delivery, InventorySlot, MaterialSlot,
    WalletEntry,
};
pub use currency::{CurrencyId, CurrencyTable, VIRTUAL_ITEM_BASE};
pub use inventory::Inventory;
pub use item::{Item, ItemDetails, ItemFlag, ItemId, ItemKind, ItemStat, ItemStatId, Rarity};
pub use market::{Listings, OfferLevel, PriceQuote, PriceSummary, Transaction, TransactionId};
pub use recipe::{Discipline, Ingredient, IngredientKind, Recipe, RecipeId};
