//! Application wiring: config in, reports out.
//!
//! The [`Advisor`] owns every cache and collaborator and exposes the
//! operations the CLI verbs map onto. Catalogs are checked against the
//! game build once at open; everything after that is the planning
//! pipeline described in [`crate::plan`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use crate::account::{AccountSnapshot, CharacterCache};
use crate::api::{GameApi, HttpApi};
use crate::catalog::{
    BuildGuard, ForgeRecipes, ItemCatalog, ItemStatCatalog, NameQuery, RecipeCatalog,
};
use crate::coin::Coin;
use crate::config::Config;
use crate::engine::StrategyEngine;
use crate::error::Result;
use crate::market::{vendor_prices, MarketOracle};
use crate::model::{CurrencyTable, ItemId, Rarity};
use crate::plan::{Books, Plan, PlanInputs, Planner, Policy};

/// A produced plan plus the display data reports need.
#[derive(Debug, Default)]
pub struct PlanReport {
    pub plan: Plan,
    pub names: HashMap<ItemId, String>,
    pub prices: HashMap<ItemId, Coin>,
}

/// Market and strategy answers for a single item.
#[derive(Debug)]
pub struct PriceReport {
    pub item: ItemId,
    pub name: String,
    pub best_bid: Option<Coin>,
    pub best_offer: Option<Coin>,
    pub strategy: &'static str,
    pub optimal_cost: Option<Coin>,
}

/// The assembled application.
pub struct Advisor {
    policy: Policy,
    api: Arc<dyn GameApi>,
    items: ItemCatalog,
    recipes: RecipeCatalog,
    itemstats: ItemStatCatalog,
    forge: ForgeRecipes,
    oracle: MarketOracle,
    characters: CharacterCache,
    books: Books,
    currencies: CurrencyTable,
}

impl Advisor {
    /// Open every cache under the configured directory and bring the
    /// catalogs up to the current game build.
    pub async fn open(config: Config) -> Result<Self> {
        let api: Arc<dyn GameApi> =
            Arc::new(HttpApi::new(config.api_url.clone(), config.api_key.clone()));
        Self::with_api(config, api).await
    }

    /// Like [`Self::open`] with a caller-supplied API, used by tests to
    /// run the whole pipeline against a scripted double.
    pub async fn with_api(config: Config, api: Arc<dyn GameApi>) -> Result<Self> {
        let cache_dir = config.cache_dir.clone();
        let mut items = ItemCatalog::open(&cache_dir)?;
        let mut recipes = RecipeCatalog::open(&cache_dir)?;
        let mut itemstats = ItemStatCatalog::open(&cache_dir)?;
        let mut characters = CharacterCache::open(&cache_dir)?;

        let guard = BuildGuard::new(&cache_dir);
        if let Some(build) = guard.needs_rebuild(api.as_ref(), config.offline).await? {
            info!(build, "rebuilding catalogs for new game build");
            items.rebuild(api.as_ref()).await?;
            recipes.rebuild(api.as_ref()).await?;
            itemstats.rebuild(api.as_ref()).await?;
            characters.rebuild(api.as_ref()).await?;
            guard.record(build)?;
        }

        let oracle = MarketOracle::open(&cache_dir, Arc::clone(&api), config.offline)?;
        let books = Books::open(&cache_dir);
        let policy = config.policy.to_policy();

        Ok(Self {
            policy,
            api,
            items,
            recipes,
            itemstats,
            forge: ForgeRecipes::default(),
            oracle,
            characters,
            books,
            currencies: CurrencyTable::default(),
        })
    }

    /// Replace the run policy, closure hooks included.
    pub fn set_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    pub fn books(&self) -> &Books {
        &self.books
    }

    pub fn itemstats(&self) -> &ItemStatCatalog {
        &self.itemstats
    }

    /// Resolve an item argument: a raw id, or a case-exact name.
    pub fn resolve_item(&self, arg: &str, rarity: Option<Rarity>) -> Result<ItemId> {
        if let Ok(id) = arg.parse::<u32>() {
            return Ok(ItemId(id));
        }
        self.items.search_name(
            arg,
            &NameQuery {
                rarity,
                ..NameQuery::default()
            },
        )
    }

    /// Display name for an item, virtual items included.
    pub fn display_name(&self, item: ItemId) -> String {
        if let Some(currency) = self.currencies.currency_for(item) {
            if let Some(name) = self.currencies.name(currency) {
                return name.to_string();
            }
        }
        match self.items.get(item) {
            Ok(Some(record)) => record.name.clone(),
            _ => format!("item {item}"),
        }
    }

    /// Run the full planning pipeline against the live account.
    pub async fn plan(&mut self) -> Result<PlanReport> {
        let snapshot =
            AccountSnapshot::assemble(self.api.as_ref(), &mut self.characters, &self.currencies)
                .await?;
        let pending_buys = self.oracle.pending_buys().await?;
        let pending_sells = self.oracle.pending_sells().await?;
        let total_sold = self.oracle.total_sold().await?;

        let goals = self.books.goals()?;
        let stockpile = self.books.stockpile()?;

        let inputs = PlanInputs {
            inventory: snapshot.inventory.clone(),
            pending_buys: pending_buys.quantities,
            pending_sells: pending_sells.quantities,
            total_sold,
        };

        let mut engine = StrategyEngine::new(&self.recipes, &self.forge, self.currencies.clone());
        if self.policy.can_craft_recipe.is_none() {
            let profile = snapshot.crafting.clone();
            engine.set_can_craft(Arc::new(move |recipe| profile.can_craft(recipe)));
        }

        // Everything the passes may price: stockpiles, goals, open orders.
        let seeds: Vec<ItemId> = {
            let mut seeds: BTreeSet<ItemId> = BTreeSet::new();
            seeds.extend(stockpile.iter().map(|&(item, _)| item));
            seeds.extend(goals.iter().map(|&(item, _)| item));
            seeds.extend(inputs.pending_buys.keys().copied());
            seeds.extend(inputs.pending_sells.keys().copied());
            seeds.into_iter().collect()
        };
        let related = engine.gather_related_items(&seeds)?;
        debug!(seeds = seeds.len(), related = related.len(), "prefetching prices");
        self.oracle.prefetch_prices(&related).await?;

        let prices = self.price_table(&related).await?;
        engine.set_prices(prices.clone());

        let plan = Planner::new(&mut engine, &self.policy).plan(&goals, &stockpile, &inputs)?;

        let mut names = HashMap::new();
        for inventory in [
            &plan.buy_items,
            &plan.craft_items,
            &plan.obtain_items,
            &plan.refined_items,
            &plan.sell_goal_items,
            &plan.craft_goal_items,
        ] {
            for (item, _) in inventory.iter() {
                names
                    .entry(item)
                    .or_insert_with(|| self.display_name(item));
            }
        }

        Ok(PlanReport {
            plan,
            names,
            prices,
        })
    }

    /// Buy prices for `items`: the lowest standing sell offer, undercut by
    /// NPC vendors where they sell the item, then the user's adjustment
    /// hook.
    async fn price_table(&self, items: &[ItemId]) -> Result<HashMap<ItemId, Coin>> {
        let summaries = self.oracle.prices_multi(items).await?;
        let mut table: HashMap<ItemId, Coin> = summaries
            .iter()
            .filter_map(|(&item, summary)| summary.best_offer().map(|price| (item, price)))
            .collect();

        for (item, price) in vendor_prices() {
            table
                .entry(item)
                .and_modify(|current| *current = (*current).min(price))
                .or_insert(price);
        }

        if let Some(adjust) = &self.policy.adjust_prices {
            adjust(&mut table);
        }
        Ok(table)
    }

    /// Market quote and optimal strategy for one item.
    pub async fn price(&mut self, arg: &str, rarity: Option<Rarity>) -> Result<PriceReport> {
        let item = self.resolve_item(arg, rarity)?;
        let summary = self.oracle.price(item).await?;

        let mut engine = StrategyEngine::new(&self.recipes, &self.forge, self.currencies.clone());
        let related = engine.gather_related_items(&[item])?;
        self.oracle.prefetch_prices(&related).await?;
        let prices = self.price_table(&related).await?;
        engine.set_prices(prices);

        let strategy = engine.optimal_strategy(item)?;
        let optimal_cost = engine.optimal_cost(item)?;

        Ok(PriceReport {
            item,
            name: self.display_name(item),
            best_bid: summary.as_ref().and_then(|s| s.best_bid()),
            best_offer: summary.as_ref().and_then(|s| s.best_offer()),
            strategy: strategy.kind(),
            optimal_cost,
        })
    }

    /// Force the next market query to refetch.
    pub fn refresh(&self) -> Result<()> {
        self.oracle.invalidate()
    }
}
