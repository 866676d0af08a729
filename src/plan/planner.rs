//! The multi-pass planner.
//!
//! Pass 1 covers every negative inventory count with the item's optimal
//! strategy. Pass 2 tops craftable stockpiles up to their targets. Pass 3
//! converts surplus raw materials through refine-only recipes, walking
//! planned purchases back down. Craftable-now accounting then replays the
//! craft list against the materials actually on hand.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::policy::Policy;
use super::state::PlanState;
use crate::coin::Coin;
use crate::engine::{ingredient_item, Strategy, StrategyEngine};
use crate::error::{PlanError, Result};
use crate::model::{CurrencyTable, Inventory, ItemId, Recipe};

/// Everything the planner reads but does not fetch: the account snapshot
/// and the oracle's order data, resolved by the caller up front.
#[derive(Debug, Clone, Default)]
pub struct PlanInputs {
    /// Owned quantities: bags, bank, materials, delivery box, wallet.
    pub inventory: Inventory,
    /// Open buy orders, assumed to eventually fill.
    pub pending_buys: HashMap<ItemId, i64>,
    /// Quantities currently listed for sale.
    pub pending_sells: HashMap<ItemId, i64>,
    /// Cumulative lifetime sales per item.
    pub total_sold: HashMap<ItemId, i64>,
}

/// One crafting work item with its craftable-now counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CraftRow {
    pub item: ItemId,
    /// Units the plan calls for.
    pub count: i64,
    /// Units buildable right now, after earlier rows consumed their share
    /// of the materials on hand.
    pub sequential_now: i64,
    /// Units buildable right now if this were the only crafting target.
    pub solo_now: i64,
}

/// The finished work plan.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub buy_items: Inventory,
    pub craft_items: Inventory,
    /// Items with no known strategy; downstream reports list these without
    /// prices.
    pub obtain_items: Inventory,
    /// Units produced by the auto-refine pass in place of planned
    /// purchases.
    pub refined_items: Inventory,
    /// Goal units to list straight from stock.
    pub sell_goal_items: Inventory,
    /// Goal units that must be produced before they can be listed.
    pub craft_goal_items: Inventory,
    pub craft_rows: Vec<CraftRow>,
    /// Coin spent if every `buy_items` row fills at the planned price.
    pub buy_cost: Coin,
}

/// Runs the planning passes over a configured engine.
pub struct Planner<'e, 'a> {
    engine: &'e mut StrategyEngine<'a>,
    policy: &'e Policy,
    currencies: CurrencyTable,
}

impl<'e, 'a> Planner<'e, 'a> {
    pub fn new(engine: &'e mut StrategyEngine<'a>, policy: &'e Policy) -> Self {
        let currencies = engine.currencies().clone();
        Self {
            engine,
            policy,
            currencies,
        }
    }

    /// Produce a work plan for `goals` and `stockpile` against `inputs`.
    ///
    /// The engine's price table must already be populated (the caller
    /// prefetches via `gather_related_items`); this method installs the
    /// remaining engine parameters from the policy and the goal set.
    pub fn plan(
        &mut self,
        goals: &[(ItemId, i64)],
        stockpile: &[(ItemId, i64)],
        inputs: &PlanInputs,
    ) -> Result<Plan> {
        let goals = self.effective_goals(goals, inputs);
        let targets: BTreeMap<ItemId, i64> = stockpile.iter().copied().collect();
        self.configure_engine(&goals);

        // Working inventory: what we own plus what will arrive.
        let mut working = inputs.inventory.clone();
        for (&item, &count) in &inputs.pending_buys {
            working.add(item, count);
        }
        let mut state = PlanState::new(working);

        let (sell_goal_items, craft_goal_items) = self.allocate_goals(&goals, inputs, &mut state);

        let shortages: Vec<ItemId> = {
            let mut ids: HashSet<ItemId> = targets
                .iter()
                .filter(|&(&item, &target)| state.inventory.count(item) < target)
                .map(|(&item, _)| item)
                .collect();
            ids.extend(state.inventory.iter().filter(|&(_, n)| n < 0).map(|(i, _)| i));
            let mut ids: Vec<ItemId> = ids.into_iter().collect();
            ids.sort_unstable();
            ids
        };
        debug!(shortages = shortages.len(), goals = goals.len(), "planning");

        self.cover_negatives(&mut state, &shortages)?;
        self.top_up_stockpiles(&mut state, &targets)?;
        let refined_items = self.auto_refine(&mut state, &targets)?;
        let craft_rows = self.craftable_now(&state, &inputs.inventory)?;

        let mut buy_cost = Coin::ZERO;
        for (item, count) in state.buy_items.iter() {
            if let Some(price) = self.engine.price(item) {
                buy_cost += price * Decimal::from(count);
            }
        }

        info!(
            buys = state.buy_items.len(),
            crafts = state.craft_items.len(),
            obtains = state.obtain_items.len(),
            "plan complete"
        );

        Ok(Plan {
            buy_items: state.buy_items,
            craft_items: state.craft_items,
            obtain_items: state.obtain_items,
            refined_items,
            sell_goal_items,
            craft_goal_items,
            craft_rows,
            buy_cost,
        })
    }

    /// Apply auto-goals and the sell filter, returning goals sorted by id.
    fn effective_goals(&self, goals: &[(ItemId, i64)], inputs: &PlanInputs) -> Vec<(ItemId, i64)> {
        let mut map: BTreeMap<ItemId, i64> = goals.iter().copied().collect();

        if self.policy.auto_goals {
            // Items with sales history stay in the pipeline: keep a batch
            // ahead of the lifetime total unless an explicit goal exists.
            for (&item, &sold) in &inputs.total_sold {
                if sold > 0 {
                    map.entry(item)
                        .or_insert(sold + self.policy.sell_batch_size);
                }
            }
        }

        if let Some(filter) = &self.policy.sell_filter {
            map.retain(|&item, _| filter(item));
        }

        map.into_iter().collect()
    }

    fn configure_engine(&mut self, goals: &[(ItemId, i64)]) {
        // We do not buy what we are trying to sell.
        let mut forbid_buy = self.policy.forbid_buy.clone();
        forbid_buy.extend(goals.iter().map(|&(item, _)| item));
        self.engine.set_forbid_buy(forbid_buy);
        self.engine.set_forbid_craft(self.policy.forbid_craft.clone());
        self.engine
            .set_expand_bundles(self.policy.expand_research_bundles);

        if let Some(predicate) = &self.policy.can_craft_recipe {
            self.engine.set_can_craft(predicate.clone());
        }
        if let Some(bundles) = &self.policy.research_note_strategies {
            self.engine.set_bundles(bundles.clone());
        }
        if !self.policy.extra_strategies.is_empty() {
            self.engine
                .set_extras(self.policy.extra_strategies.clone());
        }
    }

    /// Split each goal's outstanding shortfall into sell-from-stock and
    /// must-craft portions, deducting the whole shortfall from inventory.
    fn allocate_goals(
        &self,
        goals: &[(ItemId, i64)],
        inputs: &PlanInputs,
        state: &mut PlanState,
    ) -> (Inventory, Inventory) {
        let mut sell_goal_items = Inventory::new();
        let mut craft_goal_items = Inventory::new();

        for &(item, goal) in goals {
            let listed = inputs.pending_sells.get(&item).copied().unwrap_or(0);
            let sold = inputs.total_sold.get(&item).copied().unwrap_or(0);
            let to_sell = (goal - listed - sold).min(self.policy.sell_batch_size);
            if to_sell <= 0 {
                continue;
            }

            let from_stock = to_sell.min(state.inventory.count(item).max(0));
            sell_goal_items.add(item, from_stock);
            craft_goal_items.add(item, to_sell - from_stock);
            state.inventory.sub(item, to_sell);
        }

        (sell_goal_items, craft_goal_items)
    }

    /// The strategy a pass may apply: the optimal one, unless its cost is
    /// undefined, in which case the item is demoted to an obtain row. An
    /// uncostable craft would otherwise drag unpriceable ingredients into
    /// the plan.
    fn applicable_strategy(&mut self, item: ItemId) -> Result<Arc<Strategy>> {
        let strategy = self.engine.optimal_strategy(item)?;
        if strategy.is_unknown() || self.engine.optimal_cost(item)?.is_some() {
            return Ok(strategy);
        }
        Ok(Arc::new(Strategy::Unknown { item }))
    }

    /// Pass 1: every negative count gets covered by its optimal strategy;
    /// ingredient subtractions keep the pending set fed.
    fn cover_negatives(&mut self, state: &mut PlanState, seeds: &[ItemId]) -> Result<()> {
        for &item in seeds {
            state.push_pending(item);
        }

        while let Some(item) = state.pop_pending() {
            let have = state.inventory.count(item);
            if have >= 0 {
                continue;
            }
            let strategy = self.applicable_strategy(item)?;
            strategy.apply(&self.currencies, state, -have);
            self.check_floor(state, item, 0)?;
        }
        Ok(())
    }

    /// Pass 2: top inventories up to their stockpile targets, skipping
    /// items whose optimal strategy is Buy or Unknown — those are acquired
    /// just-in-time, not stockpiled.
    fn top_up_stockpiles(
        &mut self,
        state: &mut PlanState,
        targets: &BTreeMap<ItemId, i64>,
    ) -> Result<()> {
        for &item in targets.keys() {
            state.push_pending(item);
        }

        while let Some(item) = state.pop_pending() {
            // Ingredients pulled negative by a top-up craft are covered
            // unconditionally, exactly as in pass 1.
            let have = state.inventory.count(item);
            if have < 0 {
                let strategy = self.applicable_strategy(item)?;
                strategy.apply(&self.currencies, state, -have);
                self.check_floor(state, item, 0)?;
            }

            let target = targets.get(&item).copied().unwrap_or(0);
            let have = state.inventory.count(item);
            if have >= target {
                continue;
            }

            let strategy = self.applicable_strategy(item)?;
            if strategy.is_buy() || strategy.is_unknown() {
                continue;
            }
            strategy.apply(&self.currencies, state, target - have);
            self.check_floor(state, item, target)?;
        }
        Ok(())
    }

    /// Pass 3: burn surplus raw materials through refine-only recipes,
    /// replacing planned buy/obtain units of the refined item.
    fn auto_refine(
        &mut self,
        state: &mut PlanState,
        targets: &BTreeMap<ItemId, i64>,
    ) -> Result<Inventory> {
        let mut refined_items = Inventory::new();

        for &item in &self.policy.auto_refine {
            let candidates = self.engine.valid_strategies(item, true)?;
            for strategy in candidates.iter().filter(|s| s.is_refine_only()) {
                let Strategy::Craft { recipe } = strategy else {
                    continue;
                };
                loop {
                    let outstanding =
                        state.buy_items.count(item) + state.obtain_items.count(item);
                    if outstanding <= 0 {
                        break;
                    }
                    if !self.consume_surplus(state, targets, recipe) {
                        break;
                    }

                    let produced = recipe.output_count() as i64;
                    state.inventory.add(item, produced);

                    let replaced = produced.min(outstanding);
                    let from_buy = replaced.min(state.buy_items.count(item));
                    state.buy_items.sub(item, from_buy);
                    state.obtain_items.sub(item, replaced - from_buy);
                    refined_items.add(item, replaced);
                }
            }
        }

        if !refined_items.is_empty() {
            debug!(items = refined_items.len(), "auto-refine replaced purchases");
        }
        Ok(refined_items)
    }

    /// Consume one craft's ingredients if every one is covered by surplus
    /// (inventory above its stockpile reserve).
    fn consume_surplus(
        &self,
        state: &mut PlanState,
        targets: &BTreeMap<ItemId, i64>,
        recipe: &Recipe,
    ) -> bool {
        let mut takes: Vec<(ItemId, i64)> = Vec::with_capacity(recipe.ingredients.len());
        for ing in &recipe.ingredients {
            let Some(item) = ingredient_item(ing.kind, ing.id, &self.currencies) else {
                return false;
            };
            let reserve = targets.get(&item).copied().unwrap_or(0);
            let surplus = state.inventory.count(item) - reserve;
            if surplus < i64::from(ing.count) {
                return false;
            }
            takes.push((item, i64::from(ing.count)));
        }
        for (item, count) in takes {
            state.inventory.sub(item, count);
        }
        true
    }

    /// Sequential and solo craftable-now counts for every craft entry, in
    /// first-craft order. The material pool is what the account actually
    /// holds; planned purchases have not arrived yet.
    fn craftable_now(&mut self, state: &PlanState, on_hand: &Inventory) -> Result<Vec<CraftRow>> {
        let mut rows = Vec::new();
        let mut shared_pool = on_hand.clone();

        for &item in &state.craft_order {
            let count = state.craft_items.count(item);
            if count <= 0 {
                continue;
            }
            let sequential_now = self.buildable(item, count, &mut shared_pool)?;
            let mut solo_pool = on_hand.clone();
            let solo_now = self.buildable(item, count, &mut solo_pool)?;
            rows.push(CraftRow {
                item,
                count,
                sequential_now,
                solo_now,
            });
        }
        Ok(rows)
    }

    /// Units of `item` producible from `pool` right now, capped at `want`.
    /// Crafts commit batch-by-batch so a failed batch leaves the pool
    /// untouched.
    fn buildable(&mut self, item: ItemId, want: i64, pool: &mut Inventory) -> Result<i64> {
        let mut produced = 0;
        while produced < want {
            if self.policy.buy_on_demand.contains(&item) {
                break;
            }
            let strategy = self.engine.optimal_strategy(item)?;
            let Strategy::Craft { recipe } = &*strategy else {
                break;
            };

            // One batch at a time; a failed batch leaves the pool as-is.
            let recipe = recipe.clone();
            let mut trial = pool.clone();
            if !self.take_ingredients(&recipe, 1, &mut trial)? {
                break;
            }
            *pool = trial;
            produced += recipe.output_count() as i64;
        }
        Ok(produced.min(want))
    }

    /// Take one recipe run's worth of every ingredient out of `pool`,
    /// multiplied by `times`.
    fn take_ingredients(
        &mut self,
        recipe: &Recipe,
        times: i64,
        pool: &mut Inventory,
    ) -> Result<bool> {
        for ing in &recipe.ingredients {
            let Some(item) = ingredient_item(ing.kind, ing.id, &self.currencies) else {
                return Ok(false);
            };
            if !self.take_from_pool(item, i64::from(ing.count) * times, pool)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Take `count` units of `item` out of `pool`, crafting the shortfall
    /// when the item's optimal strategy is a craft. Buy-on-demand items
    /// never descend; they come from stock or not at all.
    fn take_from_pool(&mut self, item: ItemId, count: i64, pool: &mut Inventory) -> Result<bool> {
        let from_stock = pool.count(item).max(0).min(count);
        pool.sub(item, from_stock);
        let missing = count - from_stock;
        if missing == 0 {
            return Ok(true);
        }

        if self.policy.buy_on_demand.contains(&item) {
            return Ok(false);
        }
        let strategy = self.engine.optimal_strategy(item)?;
        let Strategy::Craft { recipe } = &*strategy else {
            return Ok(false);
        };

        let recipe = recipe.clone();
        let output = recipe.output_count() as i64;
        let times = (missing + output - 1) / output;
        if !self.take_ingredients(&recipe, times, pool)? {
            return Ok(false);
        }
        pool.add(item, output * times - missing);
        Ok(true)
    }

    fn check_floor(&self, state: &PlanState, item: ItemId, floor: i64) -> Result<()> {
        let have = state.inventory.count(item);
        if have < floor {
            return Err(PlanError::StrategyPostcondition { item, have, floor }.into());
        }
        Ok(())
    }
}
