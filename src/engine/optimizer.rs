//! Minimum-cost strategy selection over the recursive recipe graph.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use super::research::ResearchBundle;
use super::strategy::{ingredient_item, NoteSource, Strategy};
use crate::catalog::{ForgeRecipes, RecipeCatalog};
use crate::coin::Coin;
use crate::error::Result;
use crate::model::{CurrencyTable, ItemId, Recipe, RecipeId};

/// Craftability predicate. The default accepts everything; the planner
/// installs the account's crafting profile.
pub type CanCraft = Arc<dyn Fn(&Recipe) -> bool + Send + Sync>;

/// Per-run strategy optimizer.
///
/// Owns the run's parameters (price table, forbid sets, craftability,
/// bundle handling, user extras) and two memo tables keyed by item: the
/// chosen strategy and its cost. Any parameter change clears both memos,
/// so answers are always consistent with the current parameters. Lifetime
/// is one planning invocation.
pub struct StrategyEngine<'a> {
    recipes: &'a RecipeCatalog,
    forge: &'a ForgeRecipes,
    currencies: CurrencyTable,

    prices: HashMap<ItemId, Coin>,
    forbid_buy: HashSet<ItemId>,
    forbid_craft: HashSet<ItemId>,
    can_craft: CanCraft,
    bundles: Vec<ResearchBundle>,
    expand_bundles: bool,
    extras: HashMap<ItemId, Vec<Strategy>>,

    strategy_memo: HashMap<ItemId, Arc<Strategy>>,
    cost_memo: HashMap<ItemId, Option<Coin>>,
    /// Items currently being resolved; a re-entrant lookup is a recipe
    /// cycle and costs out as undefined.
    resolving: HashSet<ItemId>,
}

impl<'a> StrategyEngine<'a> {
    pub fn new(
        recipes: &'a RecipeCatalog,
        forge: &'a ForgeRecipes,
        currencies: CurrencyTable,
    ) -> Self {
        Self {
            recipes,
            forge,
            currencies,
            prices: HashMap::new(),
            forbid_buy: HashSet::new(),
            forbid_craft: HashSet::new(),
            can_craft: Arc::new(|_| true),
            bundles: super::research::default_bundles(),
            expand_bundles: false,
            extras: HashMap::new(),
            strategy_memo: HashMap::new(),
            cost_memo: HashMap::new(),
            resolving: HashSet::new(),
        }
    }

    pub fn currencies(&self) -> &CurrencyTable {
        &self.currencies
    }

    pub fn price(&self, item: ItemId) -> Option<Coin> {
        self.prices.get(&item).copied()
    }

    pub fn set_prices(&mut self, prices: HashMap<ItemId, Coin>) {
        self.prices = prices;
        self.clear_memos();
    }

    pub fn set_forbid_buy(&mut self, items: HashSet<ItemId>) {
        self.forbid_buy = items;
        self.clear_memos();
    }

    pub fn set_forbid_craft(&mut self, items: HashSet<ItemId>) {
        self.forbid_craft = items;
        self.clear_memos();
    }

    pub fn set_can_craft(&mut self, predicate: CanCraft) {
        self.can_craft = predicate;
        self.clear_memos();
    }

    pub fn set_bundles(&mut self, bundles: Vec<ResearchBundle>) {
        self.bundles = bundles;
        self.clear_memos();
    }

    pub fn set_expand_bundles(&mut self, expand: bool) {
        self.expand_bundles = expand;
        self.clear_memos();
    }

    /// Install user-supplied extra strategies, grouped by output item.
    pub fn set_extras(&mut self, extras: Vec<Strategy>) {
        self.extras.clear();
        for strategy in extras {
            self.extras.entry(strategy.item()).or_default().push(strategy);
        }
        self.clear_memos();
    }

    fn clear_memos(&mut self) {
        self.strategy_memo.clear();
        self.cost_memo.clear();
        self.resolving.clear();
    }

    /// Enumerate the candidate strategies for `item`, in the fixed order
    /// that also breaks cost ties: buy, disk recipes, forge recipes,
    /// research-note bundles, user extras.
    pub fn valid_strategies(
        &self,
        item: ItemId,
        allow_refine_only: bool,
    ) -> Result<Vec<Strategy>> {
        let mut out = Vec::new();

        if !self.forbid_buy.contains(&item) {
            if let Some(&price) = self.prices.get(&item) {
                out.push(Strategy::Buy { item, price });
            }
        }

        if !self.forbid_craft.contains(&item) {
            for &id in self.recipes.search_output(item) {
                match self.recipes.get(id)? {
                    Some(recipe) => self.push_craft(&mut out, recipe, allow_refine_only),
                    None => warn!(recipe = %id, "indexed recipe has no record, skipping"),
                }
            }
            for &id in self.forge.search_output(item) {
                match self.forge.get(id) {
                    Some(recipe) => self.push_craft(&mut out, recipe, allow_refine_only),
                    None => warn!(recipe = %id, "forge index is inconsistent, skipping"),
                }
            }
        }

        if item == self.currencies.research_note_item() {
            if self.expand_bundles {
                for bundle in self.bundles.iter().flat_map(ResearchBundle::singletons) {
                    out.push(self.bundle_strategy(item, bundle.name, bundle.sources));
                }
            } else {
                for bundle in &self.bundles {
                    out.push(self.bundle_strategy(
                        item,
                        bundle.name.clone(),
                        bundle.sources.clone(),
                    ));
                }
            }
        }

        if let Some(extras) = self.extras.get(&item) {
            out.extend(extras.iter().cloned());
        }

        Ok(out)
    }

    fn push_craft(&self, out: &mut Vec<Strategy>, recipe: Arc<Recipe>, allow_refine_only: bool) {
        if recipe.refine_only && !allow_refine_only {
            return;
        }
        if (self.can_craft)(&recipe) {
            out.push(Strategy::Craft { recipe });
        }
    }

    fn bundle_strategy(&self, item: ItemId, name: String, sources: Vec<NoteSource>) -> Strategy {
        Strategy::ResearchNote {
            name,
            item,
            sources,
        }
    }

    /// The cheapest way to obtain `item` under the current parameters.
    ///
    /// The candidate with the minimum *defined* cost wins; ties break
    /// toward enumeration order. When every candidate is undefined the
    /// first is kept, and when there are none at all an `Unknown` is
    /// fabricated. Fills both memos: the winning cost is the one
    /// computed here, so a strategy whose recipe loops back to `item`
    /// stays undefined instead of being re-costed without the guard.
    pub fn optimal_strategy(&mut self, item: ItemId) -> Result<Arc<Strategy>> {
        if let Some(memo) = self.strategy_memo.get(&item) {
            return Ok(Arc::clone(memo));
        }

        // Guard for the whole selection: a recipe that loops back to
        // `item` must see it as already-resolving, not recurse forever.
        let entered = self.resolving.insert(item);

        let candidates = self.valid_strategies(item, false)?;
        let mut best: Option<(usize, Coin)> = None;
        for (pos, candidate) in candidates.iter().enumerate() {
            let cost = self.strategy_cost(candidate)?;
            if let Some(cost) = cost {
                let better = best.map_or(true, |(_, c)| cost < c);
                if better {
                    best = Some((pos, cost));
                }
            }
        }

        if entered {
            self.resolving.remove(&item);
        }

        let mut candidates = candidates;
        let chosen = match best {
            Some((pos, _)) => Arc::new(candidates.swap_remove(pos)),
            None if !candidates.is_empty() => Arc::new(candidates.swap_remove(0)),
            None => Arc::new(Strategy::Unknown { item }),
        };

        self.strategy_memo.insert(item, Arc::clone(&chosen));
        self.cost_memo.insert(item, best.map(|(_, cost)| cost));
        Ok(chosen)
    }

    /// `optimal_strategy(item).cost()`, memoized. `None` means undefined:
    /// no candidate could be costed, or the lookup re-entered a cycle.
    pub fn optimal_cost(&mut self, item: ItemId) -> Result<Option<Coin>> {
        if let Some(&memo) = self.cost_memo.get(&item) {
            return Ok(memo);
        }
        if self.resolving.contains(&item) {
            warn!(%item, "recipe cycle detected, treating cost as undefined");
            return Ok(None);
        }

        self.optimal_strategy(item)?;
        Ok(self.cost_memo.get(&item).copied().unwrap_or(None))
    }

    /// Cost of one strategy under the current parameters. `None` when any
    /// input it depends on is unpriced.
    pub fn strategy_cost(&mut self, strategy: &Strategy) -> Result<Option<Coin>> {
        match strategy {
            Strategy::Buy { price, .. } => Ok(Some(*price)),
            Strategy::Unknown { .. } => Ok(None),
            Strategy::Craft { recipe } => self.craft_cost(recipe),
            Strategy::ResearchNote { sources, .. } => self.bundle_cost(sources),
        }
    }

    /// Σ count/output_count × optimal_cost(ingredient); undefined if any
    /// ingredient is unpriced or names a currency outside the bijection.
    fn craft_cost(&mut self, recipe: &Recipe) -> Result<Option<Coin>> {
        let output = Decimal::from(recipe.output_count());
        let mut total = Coin::ZERO;
        for ing in &recipe.ingredients {
            let Some(item) = ingredient_item(ing.kind, ing.id, &self.currencies) else {
                return Ok(None);
            };
            let Some(cost) = self.optimal_cost(item)? else {
                return Ok(None);
            };
            total += Decimal::from(ing.count) / output * cost;
        }
        Ok(Some(total))
    }

    /// Σ count·cost / Σ count·notes; undefined when the note sum is zero.
    fn bundle_cost(&mut self, sources: &[NoteSource]) -> Result<Option<Coin>> {
        let mut notes = Decimal::ZERO;
        let mut total = Coin::ZERO;
        for source in sources {
            let Some(cost) = self.optimal_cost(source.item)? else {
                return Ok(None);
            };
            total += Decimal::from(source.count) * cost;
            notes += Decimal::from(source.count) * Decimal::from(source.notes);
        }
        if notes.is_zero() {
            return Ok(None);
        }
        Ok(Some(total / notes))
    }

    /// Every item a planner over `seeds` might need a price for: the DFS
    /// closure of `valid_strategies -> related_items`, refine-only recipes
    /// included. Sorted for determinism.
    pub fn gather_related_items(&self, seeds: &[ItemId]) -> Result<Vec<ItemId>> {
        let mut visited: HashSet<ItemId> = HashSet::new();
        let mut stack: Vec<ItemId> = seeds.to_vec();

        while let Some(item) = stack.pop() {
            if !visited.insert(item) {
                continue;
            }
            for strategy in self.valid_strategies(item, true)? {
                for related in strategy.related_items(&self.currencies) {
                    if !visited.contains(&related) {
                        stack.push(related);
                    }
                }
            }
        }

        let mut items: Vec<ItemId> = visited.into_iter().collect();
        items.sort_unstable();
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::coin;
    use crate::model::{Discipline, Ingredient};
    use rust_decimal_macros::dec;

    fn recipe(id: u32, output: u32, count: u32, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id: RecipeId(id),
            kind: "Component".into(),
            output_item_id: ItemId(output),
            output_item_count: count,
            min_rating: 0,
            disciplines: vec![Discipline::Weaponsmith],
            ingredients,
            refine_only: false,
        }
    }

    fn fixture(recipes: Vec<Recipe>) -> (tempfile::TempDir, RecipeCatalog, ForgeRecipes) {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RecipeCatalog::open(dir.path()).unwrap();
        for r in &recipes {
            catalog.add(r).unwrap();
        }
        (dir, catalog, ForgeRecipes::new(vec![]))
    }

    fn prices(pairs: &[(u32, i64)]) -> HashMap<ItemId, Coin> {
        pairs.iter().map(|&(id, p)| (ItemId(id), coin(p))).collect()
    }

    #[test]
    fn buy_comes_before_craft_in_enumeration() {
        let (_dir, catalog, forge) = fixture(vec![recipe(
            1,
            10,
            1,
            vec![Ingredient::item(ItemId(20), 2)],
        )]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());
        engine.set_prices(prices(&[(10, 100), (20, 50)]));

        let candidates = engine.valid_strategies(ItemId(10), false).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].is_buy());
        assert!(matches!(candidates[1], Strategy::Craft { .. }));
    }

    #[test]
    fn equal_costs_keep_the_earlier_candidate() {
        // Craft cost 2*50 = 100 equals the buy price; buy enumerates first.
        let (_dir, catalog, forge) = fixture(vec![recipe(
            1,
            10,
            1,
            vec![Ingredient::item(ItemId(20), 2)],
        )]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());
        engine.set_prices(prices(&[(10, 100), (20, 50)]));

        let chosen = engine.optimal_strategy(ItemId(10)).unwrap();
        assert!(chosen.is_buy());
    }

    #[test]
    fn refine_only_recipes_are_hidden_by_default() {
        let mut refine = recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 2)]);
        refine.refine_only = true;
        let (_dir, catalog, forge) = fixture(vec![refine]);
        let engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());

        assert!(engine.valid_strategies(ItemId(10), false).unwrap().is_empty());
        assert_eq!(engine.valid_strategies(ItemId(10), true).unwrap().len(), 1);
    }

    #[test]
    fn parameter_changes_invalidate_memos() {
        let (_dir, catalog, forge) = fixture(vec![]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());
        engine.set_prices(prices(&[(10, 100)]));
        assert_eq!(engine.optimal_cost(ItemId(10)).unwrap(), Some(dec!(100)));

        engine.set_prices(prices(&[(10, 80)]));
        assert_eq!(engine.optimal_cost(ItemId(10)).unwrap(), Some(dec!(80)));

        engine.set_forbid_buy([ItemId(10)].into_iter().collect());
        assert_eq!(engine.optimal_cost(ItemId(10)).unwrap(), None);
    }

    #[test]
    fn recipe_cycles_cost_out_as_undefined() {
        // 10 <- 20 <- 10: the graph promises never to do this, but a bad
        // record must not hang the optimizer.
        let (_dir, catalog, forge) = fixture(vec![
            recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 1)]),
            recipe(2, 20, 1, vec![Ingredient::item(ItemId(10), 1)]),
        ]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());

        assert_eq!(engine.optimal_cost(ItemId(10)).unwrap(), None);
    }

    #[test]
    fn self_referential_recipe_costs_out_as_undefined() {
        // A record that lists its own output as an ingredient. Even with
        // the other inputs priced, the cost must come back undefined
        // rather than recursing until the stack runs out.
        let (_dir, catalog, forge) = fixture(vec![recipe(
            1,
            10,
            7,
            vec![
                Ingredient::item(ItemId(20), 50),
                Ingredient::item(ItemId(10), 1),
            ],
        )]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());
        engine.set_prices(prices(&[(20, 10)]));

        assert_eq!(engine.optimal_cost(ItemId(10)).unwrap(), None);
        let chosen = engine.optimal_strategy(ItemId(10)).unwrap();
        assert!(matches!(*chosen, Strategy::Craft { .. }));
    }

    #[test]
    fn default_forge_promotions_price_out() {
        let (_dir, catalog, _unused) = fixture(vec![]);
        let forge = ForgeRecipes::default();
        let currencies = CurrencyTable::default();
        let shard = currencies.spirit_shard_item();
        let mut engine = StrategyEngine::new(&catalog, &forge, currencies);

        // Vicious Claw: 50 Large Claws + 5 dust + 5 spirit shards -> 6.
        let mut table = prices(&[(24350, 10), (24277, 20)]);
        table.insert(shard, coin(30));
        engine.set_prices(table);

        let chosen = engine.optimal_strategy(ItemId(24351)).unwrap();
        assert!(matches!(*chosen, Strategy::Craft { .. }));
        // (50*10 + 5*20 + 5*30) / 6 per promoted claw.
        assert_eq!(engine.optimal_cost(ItemId(24351)).unwrap(), Some(dec!(125)));
    }

    #[test]
    fn unknown_currency_ingredient_is_undefined() {
        let (_dir, catalog, forge) = fixture(vec![recipe(
            1,
            10,
            1,
            vec![Ingredient::currency(999, 5)],
        )]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());

        assert_eq!(engine.optimal_cost(ItemId(10)).unwrap(), None);
        // With no other candidate the craft is still the kept strategy.
        let chosen = engine.optimal_strategy(ItemId(10)).unwrap();
        assert!(matches!(*chosen, Strategy::Craft { .. }));
    }

    #[test]
    fn no_candidates_fabricates_unknown() {
        let (_dir, catalog, forge) = fixture(vec![]);
        let mut engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());
        let chosen = engine.optimal_strategy(ItemId(42)).unwrap();
        assert!(chosen.is_unknown());
        assert_eq!(chosen.item(), ItemId(42));
    }

    #[test]
    fn gather_walks_the_recipe_closure() {
        let (_dir, catalog, forge) = fixture(vec![
            recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 2)]),
            recipe(2, 20, 1, vec![Ingredient::item(ItemId(30), 3)]),
        ]);
        let engine = StrategyEngine::new(&catalog, &forge, CurrencyTable::default());

        let related = engine.gather_related_items(&[ItemId(10)]).unwrap();
        assert_eq!(related, vec![ItemId(10), ItemId(20), ItemId(30)]);
    }
}
