//! Per-run planning policy.
//!
//! Every knob ships with a usable default; users override fields instead
//! of patching the engine. The data-valued fields load from the config
//! file, the closure slots are set programmatically.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::coin::Coin;
use crate::engine::{CanCraft, ResearchBundle, Strategy};
use crate::model::ItemId;

/// Filter applied to goal items before planning.
pub type SellFilter = Arc<dyn Fn(ItemId) -> bool + Send + Sync>;

/// Hook run over the assembled price table before it reaches the engine.
pub type AdjustPrices = Arc<dyn Fn(&mut HashMap<ItemId, Coin>) + Send + Sync>;

pub struct Policy {
    /// Never satisfied by buying, regardless of price.
    pub forbid_buy: HashSet<ItemId>,
    /// Never satisfied by crafting (time-gated recipes and the like).
    pub forbid_craft: HashSet<ItemId>,
    /// Craftable items treated as purchases by the craftable-now
    /// estimator only; their recipes are not descended into.
    pub buy_on_demand: HashSet<ItemId>,
    /// Items whose refine-only recipes may consume surplus materials in
    /// planning pass 3.
    pub auto_refine: Vec<ItemId>,
    /// Cap on units listed from stock per goal per run; one trading-post
    /// listing's worth by default.
    pub sell_batch_size: i64,
    /// Top up goals for items with sales history.
    pub auto_goals: bool,
    /// Cost research-note bundle members individually instead of as
    /// family averages.
    pub expand_research_bundles: bool,

    pub can_craft_recipe: Option<CanCraft>,
    pub research_note_strategies: Option<Vec<ResearchBundle>>,
    pub extra_strategies: Vec<Strategy>,
    pub sell_filter: Option<SellFilter>,
    pub adjust_prices: Option<AdjustPrices>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            forbid_buy: HashSet::new(),
            forbid_craft: HashSet::new(),
            buy_on_demand: HashSet::new(),
            auto_refine: Vec::new(),
            sell_batch_size: 250,
            auto_goals: false,
            expand_research_bundles: false,
            can_craft_recipe: None,
            research_note_strategies: None,
            extra_strategies: Vec::new(),
            sell_filter: None,
            adjust_prices: None,
        }
    }
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policy")
            .field("forbid_buy", &self.forbid_buy)
            .field("forbid_craft", &self.forbid_craft)
            .field("buy_on_demand", &self.buy_on_demand)
            .field("auto_refine", &self.auto_refine)
            .field("sell_batch_size", &self.sell_batch_size)
            .field("auto_goals", &self.auto_goals)
            .field("expand_research_bundles", &self.expand_research_bundles)
            .finish_non_exhaustive()
    }
}
