//! The strategy sum type and its plan-state application.

use std::sync::Arc;

use tracing::warn;

use crate::coin::Coin;
use crate::model::{CurrencyId, CurrencyTable, IngredientKind, ItemId, Recipe};
use crate::plan::PlanState;

/// One member of a research-note bundle: crafting `count` of `item` and
/// salvaging the result yields `notes` research notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSource {
    pub item: ItemId,
    pub count: u32,
    pub notes: u32,
}

/// One way to obtain an item.
///
/// Costing lives on [`super::StrategyEngine`] because every variant except
/// `Buy` recurses into the optimal costs of other items; application is
/// self-contained and lives here.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Take the trading post's (or a vendor's) standing offer.
    Buy { item: ItemId, price: Coin },
    /// Run a crafting or mystic-forge recipe.
    Craft { recipe: Arc<Recipe> },
    /// Craft and salvage a bundle of gear for research notes.
    ResearchNote {
        name: String,
        /// The research-note virtual item the bundle yields.
        item: ItemId,
        sources: Vec<NoteSource>,
    },
    /// No known way to obtain the item; the plan reports it as-is.
    Unknown { item: ItemId },
}

impl Strategy {
    /// The item this strategy produces.
    pub fn item(&self) -> ItemId {
        match self {
            Self::Buy { item, .. } | Self::Unknown { item } | Self::ResearchNote { item, .. } => {
                *item
            }
            Self::Craft { recipe } => recipe.output_item_id,
        }
    }

    /// Human-readable tag for plan rows and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Buy { .. } => "buy",
            Self::Craft { .. } => "craft",
            Self::ResearchNote { .. } => "research-note",
            Self::Unknown { .. } => "obtain",
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Self::Buy { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// Whether this is a refine-only craft, eligible only for the
    /// planner's auto-refine pass.
    pub fn is_refine_only(&self) -> bool {
        matches!(self, Self::Craft { recipe } if recipe.refine_only)
    }

    /// Items a cost evaluation of this strategy may visit. Used to
    /// pre-populate the market oracle before planning.
    pub fn related_items(&self, currencies: &CurrencyTable) -> Vec<ItemId> {
        match self {
            Self::Buy { item, .. } | Self::Unknown { item } => vec![*item],
            Self::Craft { recipe } => {
                let mut items = vec![recipe.output_item_id];
                for ing in &recipe.ingredients {
                    if let Some(item) = ingredient_item(ing.kind, ing.id, currencies) {
                        items.push(item);
                    }
                }
                items
            }
            Self::ResearchNote { item, sources, .. } => {
                let mut items = vec![*item];
                items.extend(sources.iter().map(|s| s.item));
                items
            }
        }
    }

    /// Obtain `count` units of this strategy's item, recording the work in
    /// `state`. Craft-like variants round up to whole crafts, so the
    /// inventory may end up with a surplus.
    pub fn apply(&self, currencies: &CurrencyTable, state: &mut PlanState, count: i64) {
        debug_assert!(count > 0);
        match self {
            Self::Buy { item, .. } => {
                state.buy_items.add(*item, count);
                state.inventory.add(*item, count);
            }
            Self::Unknown { item } => {
                state.obtain_items.add(*item, count);
                state.inventory.add(*item, count);
            }
            Self::Craft { recipe } => {
                let output = recipe.output_count() as i64;
                let times = (count + output - 1) / output;
                let produced = output * times;

                state.craft_items.add(recipe.output_item_id, produced);
                state.inventory.add(recipe.output_item_id, produced);
                state.record_craft(recipe.output_item_id);

                for ing in &recipe.ingredients {
                    let Some(item) = ingredient_item(ing.kind, ing.id, currencies) else {
                        // Unknown currencies make the cost undefined, so an
                        // optimizer never picks this craft; reaching here
                        // means a user extra forced it.
                        warn!(recipe = %recipe.id, currency = ing.id, "skipping unknown currency ingredient");
                        continue;
                    };
                    state.inventory.sub(item, i64::from(ing.count) * times);
                    state.push_pending(item);
                }
            }
            Self::ResearchNote { item, sources, .. } => {
                let per_set: i64 = sources
                    .iter()
                    .map(|s| i64::from(s.count) * i64::from(s.notes))
                    .sum();
                if per_set == 0 {
                    // Degenerate bundle; never optimal, but stay safe.
                    state.obtain_items.add(*item, count);
                    state.inventory.add(*item, count);
                    return;
                }
                let sets = (count + per_set - 1) / per_set;

                state.craft_items.add(*item, per_set * sets);
                state.inventory.add(*item, per_set * sets);
                state.record_craft(*item);

                for source in sources {
                    state.inventory.sub(source.item, i64::from(source.count) * sets);
                    state.push_pending(source.item);
                }
            }
        }
    }
}

/// Resolve an ingredient line to item-space. Currency lines map through the
/// bijection; a currency outside it has no item and returns `None`.
pub(crate) fn ingredient_item(
    kind: IngredientKind,
    id: u32,
    currencies: &CurrencyTable,
) -> Option<ItemId> {
    match kind {
        IngredientKind::Item => Some(ItemId(id)),
        IngredientKind::Currency => currencies.item_for(CurrencyId(id)),
    }
}
