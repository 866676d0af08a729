//! Planner pass behavior: goal allocation, shortage coverage, stockpile
//! top-ups, auto-refine and the craftable-now estimator.

mod support;

use std::collections::HashMap;

use rust_decimal_macros::dec;

use support::recipe;
use tradesmith::catalog::{ForgeRecipes, RecipeCatalog};
use tradesmith::coin::{coin, Coin};
use tradesmith::engine::StrategyEngine;
use tradesmith::model::{CurrencyTable, Ingredient, Inventory, ItemId, Recipe};
use tradesmith::plan::{PlanInputs, Planner, Policy};

struct Fixture {
    _dir: tempfile::TempDir,
    recipes: RecipeCatalog,
    forge: ForgeRecipes,
}

impl Fixture {
    fn new(recipes: Vec<Recipe>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = RecipeCatalog::open(dir.path()).unwrap();
        for r in &recipes {
            catalog.add(r).unwrap();
        }
        Self {
            _dir: dir,
            recipes: catalog,
            forge: ForgeRecipes::new(vec![]),
        }
    }

    fn engine(&self, prices: &[(u32, i64)]) -> StrategyEngine<'_> {
        let mut engine =
            StrategyEngine::new(&self.recipes, &self.forge, CurrencyTable::default());
        let table: HashMap<ItemId, Coin> =
            prices.iter().map(|&(id, p)| (ItemId(id), coin(p))).collect();
        engine.set_prices(table);
        engine
    }
}

fn inventory(counts: &[(u32, i64)]) -> Inventory {
    counts.iter().map(|&(id, n)| (ItemId(id), n)).collect()
}

#[test]
fn negative_inventory_is_covered_at_market() {
    let fixture = Fixture::new(vec![]);
    let mut engine = fixture.engine(&[(10, 100)]);
    let policy = Policy::default();
    let inputs = PlanInputs {
        inventory: inventory(&[(10, -5)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    assert_eq!(plan.buy_items.count(ItemId(10)), 5);
    assert_eq!(plan.buy_cost, dec!(500));
    assert!(plan.craft_items.is_empty());
}

#[test]
fn goals_split_between_stock_and_craft() {
    // 10 is crafted from 2 x 20; the goal item itself must not be bought.
    let fixture = Fixture::new(vec![recipe(
        1,
        10,
        1,
        vec![Ingredient::item(ItemId(20), 2)],
    )]);
    let mut engine = fixture.engine(&[(10, 500), (20, 10)]);
    let policy = Policy::default();
    let inputs = PlanInputs {
        inventory: inventory(&[(10, 4)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[(ItemId(10), 10)], &[], &inputs)
        .unwrap();

    assert_eq!(plan.sell_goal_items.count(ItemId(10)), 4);
    assert_eq!(plan.craft_goal_items.count(ItemId(10)), 6);
    assert_eq!(plan.craft_items.count(ItemId(10)), 6);
    assert_eq!(plan.buy_items.count(ItemId(10)), 0);
    assert_eq!(plan.buy_items.count(ItemId(20)), 12);
    assert_eq!(plan.buy_cost, dec!(120));
}

#[test]
fn listed_and_sold_quantities_shrink_the_goal() {
    let fixture = Fixture::new(vec![]);
    let mut engine = fixture.engine(&[(10, 100)]);
    let policy = Policy::default();
    let inputs = PlanInputs {
        inventory: inventory(&[(10, 50)]),
        pending_sells: [(ItemId(10), 3)].into_iter().collect(),
        total_sold: [(ItemId(10), 5)].into_iter().collect(),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[(ItemId(10), 12)], &[], &inputs)
        .unwrap();

    // 12 goal - 3 listed - 5 sold = 4 to sell, all from stock.
    assert_eq!(plan.sell_goal_items.count(ItemId(10)), 4);
    assert!(plan.craft_goal_items.is_empty());
}

#[test]
fn auto_goals_keep_a_batch_ahead_of_sales() {
    let fixture = Fixture::new(vec![]);
    let mut engine = fixture.engine(&[(10, 100)]);
    let policy = Policy {
        auto_goals: true,
        sell_batch_size: 50,
        ..Policy::default()
    };
    let inputs = PlanInputs {
        inventory: inventory(&[(10, 200)]),
        total_sold: [(ItemId(10), 100)].into_iter().collect(),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    // Implied goal 100 + 50; outstanding 50, capped at the batch size.
    assert_eq!(plan.sell_goal_items.count(ItemId(10)), 50);
}

#[test]
fn stockpile_top_up_skips_buy_strategy_items() {
    // 20 is only craftable (from 30); 10 is cheapest to buy.
    let fixture = Fixture::new(vec![recipe(
        1,
        20,
        1,
        vec![Ingredient::item(ItemId(30), 1)],
    )]);
    let mut engine = fixture.engine(&[(10, 5), (30, 7)]);
    let policy = Policy::default();
    let inputs = PlanInputs::default();

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[(ItemId(10), 5), (ItemId(20), 3)], &inputs)
        .unwrap();

    // The buyable stockpile is acquired just-in-time, not now.
    assert_eq!(plan.buy_items.count(ItemId(10)), 0);
    assert_eq!(plan.craft_items.count(ItemId(20)), 3);
    assert_eq!(plan.buy_items.count(ItemId(30)), 3);
}

#[test]
fn top_up_covers_ingredient_negatives_even_when_buyable() {
    // Topping up 10 (craft from 2 x 20) drives 20 negative; 20 is
    // buyable and must still be covered.
    let fixture = Fixture::new(vec![recipe(
        1,
        10,
        1,
        vec![Ingredient::item(ItemId(20), 2)],
    )]);
    let mut engine = fixture.engine(&[(20, 10)]);
    let policy = Policy::default();
    let inputs = PlanInputs::default();

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[(ItemId(10), 2)], &inputs)
        .unwrap();

    assert_eq!(plan.craft_items.count(ItemId(10)), 2);
    assert_eq!(plan.buy_items.count(ItemId(20)), 4);
}

#[test]
fn unknown_items_land_in_obtain() {
    let fixture = Fixture::new(vec![]);
    let mut engine = fixture.engine(&[]);
    let policy = Policy::default();
    let inputs = PlanInputs {
        inventory: inventory(&[(99, -2)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    assert_eq!(plan.obtain_items.count(ItemId(99)), 2);
    assert_eq!(plan.buy_cost, Coin::ZERO);
}

#[test]
fn uncostable_craft_chains_land_in_obtain() {
    // 10 is craftable from 20, but 20 has no price and no recipe, so the
    // craft cannot be costed; the shortfall is reported as obtain rather
    // than a craft dragging an unpriceable ingredient into the plan.
    let fixture = Fixture::new(vec![recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 1)])]);
    let mut engine = fixture.engine(&[]);
    let policy = Policy::default();
    let inputs = PlanInputs {
        inventory: inventory(&[(10, -1)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    assert_eq!(plan.obtain_items.count(ItemId(10)), 1);
    assert!(plan.craft_items.is_empty());
    assert!(plan.buy_items.is_empty());
    assert_eq!(plan.obtain_items.count(ItemId(20)), 0);
}

#[test]
fn stockpile_top_up_skips_uncostable_crafts() {
    let fixture = Fixture::new(vec![recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 1)])]);
    let mut engine = fixture.engine(&[]);
    let policy = Policy::default();

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[(ItemId(10), 2)], &PlanInputs::default())
        .unwrap();

    // An uncostable craft is no better than Unknown for stockpiling.
    assert!(plan.craft_items.is_empty());
    assert!(plan.obtain_items.is_empty());
    assert!(plan.buy_items.is_empty());
}

#[test]
fn auto_refine_replaces_purchases_with_surplus_crafts() {
    // Refine-only: 2 x 20 -> 1 x 10. The pass-1 strategy for 10 is a buy.
    let mut refine = recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 2)]);
    refine.refine_only = true;
    let fixture = Fixture::new(vec![refine]);
    let mut engine = fixture.engine(&[(10, 100), (20, 1)]);
    let policy = Policy {
        auto_refine: vec![ItemId(10)],
        ..Policy::default()
    };
    let inputs = PlanInputs {
        inventory: inventory(&[(10, -3), (20, 10)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    assert_eq!(plan.buy_items.count(ItemId(10)), 0);
    assert_eq!(plan.refined_items.count(ItemId(10)), 3);
}

#[test]
fn auto_refine_respects_stockpile_reserves() {
    let mut refine = recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 2)]);
    refine.refine_only = true;
    let fixture = Fixture::new(vec![refine]);
    let mut engine = fixture.engine(&[(10, 100), (20, 1)]);
    let policy = Policy {
        auto_refine: vec![ItemId(10)],
        ..Policy::default()
    };
    // 20 has a reserve of 8, leaving surplus for only one craft.
    let inputs = PlanInputs {
        inventory: inventory(&[(10, -3), (20, 10)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[(ItemId(20), 8)], &inputs)
        .unwrap();

    assert_eq!(plan.refined_items.count(ItemId(10)), 1);
    assert_eq!(plan.buy_items.count(ItemId(10)), 2);
}

#[test]
fn craftable_rows_report_sequential_and_solo_counts() {
    // Two crafts share the same raw material 30, three on hand.
    let fixture = Fixture::new(vec![
        recipe(1, 10, 1, vec![Ingredient::item(ItemId(30), 1)]),
        recipe(2, 11, 1, vec![Ingredient::item(ItemId(30), 1)]),
    ]);
    let mut engine = fixture.engine(&[(30, 1)]);
    let policy = Policy::default();
    let inputs = PlanInputs {
        inventory: inventory(&[(10, -2), (11, -2), (30, 3)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    let row = |item: u32| {
        plan.craft_rows
            .iter()
            .find(|r| r.item == ItemId(item))
            .copied()
            .unwrap()
    };
    // Shortages resolve newest-first, so 11 crafts before 10 and gets
    // first claim on the shared material.
    assert_eq!(row(11).count, 2);
    assert_eq!(row(11).sequential_now, 2);
    assert_eq!(row(11).solo_now, 2);
    // In sequence only one unit of 30 is left for the second craft.
    assert_eq!(row(10).sequential_now, 1);
    assert_eq!(row(10).solo_now, 2);
}

#[test]
fn buy_on_demand_blocks_craftable_descent() {
    // 10 <- 20 <- 30; 20 is buy-on-demand, so crafting 10 now requires
    // finished 20 in stock, not raw 30.
    let fixture = Fixture::new(vec![
        recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 1)]),
        recipe(2, 20, 1, vec![Ingredient::item(ItemId(30), 1)]),
    ]);
    let mut engine = fixture.engine(&[(30, 1)]);
    let policy = Policy {
        buy_on_demand: [ItemId(20)].into_iter().collect(),
        ..Policy::default()
    };
    let inputs = PlanInputs {
        inventory: inventory(&[(10, -1), (30, 5)]),
        ..PlanInputs::default()
    };

    let plan = Planner::new(&mut engine, &policy)
        .plan(&[], &[], &inputs)
        .unwrap();

    let row = plan
        .craft_rows
        .iter()
        .find(|r| r.item == ItemId(10))
        .unwrap();
    assert_eq!(row.sequential_now, 0);
}
