//! Mutable state threaded through the planning passes.

use std::collections::HashSet;

use crate::model::{Inventory, ItemId};

/// The working inventory, the pending-work set, and the output tallies.
///
/// The inventory may hold negative counts mid-pass (unfulfilled demand);
/// the tallies only ever grow and stay non-negative, except where the
/// auto-refine pass explicitly walks `buy_items`/`obtain_items` back down.
#[derive(Debug, Clone, Default)]
pub struct PlanState {
    pub inventory: Inventory,
    pub buy_items: Inventory,
    pub craft_items: Inventory,
    pub obtain_items: Inventory,
    /// Items in the order they first entered `craft_items`; drives the
    /// sequential craftable-now accounting.
    pub craft_order: Vec<ItemId>,

    pending: Vec<ItemId>,
    pending_members: HashSet<ItemId>,
}

impl PlanState {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    /// Queue `item` for resolution. Items already waiting are not queued
    /// twice; an item may re-enter after it has been popped.
    pub fn push_pending(&mut self, item: ItemId) {
        if self.pending_members.insert(item) {
            self.pending.push(item);
        }
    }

    pub fn pop_pending(&mut self) -> Option<ItemId> {
        let item = self.pending.pop()?;
        self.pending_members.remove(&item);
        Some(item)
    }

    pub fn pending_is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Note that `item` was crafted, preserving first-craft order.
    pub fn record_craft(&mut self, item: ItemId) {
        if !self.craft_order.contains(&item) {
            self.craft_order.push(item);
        }
    }
}
