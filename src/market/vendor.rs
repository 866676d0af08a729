//! Fixed NPC vendor prices.
//!
//! A handful of crafting ingredients never trade on the trading post; the
//! master craftsmen sell them at fixed coin prices. Merging this table into
//! the engine's price map lets it cost recipes that would otherwise dead-end
//! on an unpriced ingredient.

use std::collections::HashMap;

use crate::coin::{coin, Coin};
use crate::model::ItemId;

/// `(item id, unit price in copper)` for items sold by NPC vendors.
const VENDOR_ITEMS: &[(u32, i64)] = &[
    // Thread, by tier.
    (19790, 8),   // Spool of Jute Thread
    (19789, 16),  // Spool of Wool Thread
    (19794, 24),  // Spool of Cotton Thread
    (19793, 32),  // Spool of Linen Thread
    (19791, 48),  // Spool of Silk Thread
    (19792, 64),  // Spool of Gossamer Thread
    // Smelting flux.
    (19704, 8),   // Lump of Tin
    (19750, 16),  // Lump of Coal
    (19924, 48),  // Lump of Primordium
    // Utility reagents.
    (46747, 1496), // Thermocatalytic Reagent
    (76839, 56),   // Milling Basin
];

/// Vendor buy prices keyed by item id.
pub fn vendor_prices() -> HashMap<ItemId, Coin> {
    VENDOR_ITEMS
        .iter()
        .map(|&(id, price)| (ItemId(id), coin(price)))
        .collect()
}
