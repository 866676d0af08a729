//! Owned-quantity map.

use std::collections::HashMap;

use super::item::ItemId;

/// Mapping of item id to count.
///
/// The planner's working inventory may go negative while demand is being
/// resolved; a negative count is unfulfilled demand, not an error. Zero
/// counts are pruned so iteration only sees live entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory(HashMap<ItemId, i64>);

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, item: ItemId) -> i64 {
        self.0.get(&item).copied().unwrap_or(0)
    }

    pub fn set(&mut self, item: ItemId, count: i64) {
        if count == 0 {
            self.0.remove(&item);
        } else {
            self.0.insert(item, count);
        }
    }

    pub fn add(&mut self, item: ItemId, count: i64) {
        self.set(item, self.count(item) + count);
    }

    pub fn sub(&mut self, item: ItemId, count: i64) {
        self.add(item, -count);
    }

    /// Merge every entry of `other` into this inventory.
    pub fn extend_from(&mut self, other: &Inventory) {
        for (&item, &count) in &other.0 {
            self.add(item, count);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, i64)> + '_ {
        self.0.iter().map(|(&k, &v)| (k, v))
    }

    /// Ids with a non-zero entry, in ascending order.
    pub fn ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.0.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ItemId, i64)> for Inventory {
    fn from_iter<T: IntoIterator<Item = (ItemId, i64)>>(iter: T) -> Self {
        let mut inv = Inventory::new();
        for (item, count) in iter {
            inv.add(item, count);
        }
        inv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_default_to_zero() {
        let inv = Inventory::new();
        assert_eq!(inv.count(ItemId(1)), 0);
    }

    #[test]
    fn zero_entries_are_pruned() {
        let mut inv = Inventory::new();
        inv.add(ItemId(1), 5);
        inv.sub(ItemId(1), 5);
        assert!(inv.is_empty());
    }

    #[test]
    fn negative_counts_are_allowed() {
        let mut inv = Inventory::new();
        inv.sub(ItemId(1), 3);
        assert_eq!(inv.count(ItemId(1)), -3);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn ids_are_sorted() {
        let inv: Inventory = [(ItemId(9), 1), (ItemId(2), 1), (ItemId(5), 1)]
            .into_iter()
            .collect();
        assert_eq!(inv.ids(), vec![ItemId(2), ItemId(5), ItemId(9)]);
    }
}
