//! End-to-end pipeline tests through [`Advisor`] with a scripted API.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use rust_decimal_macros::dec;

use support::{item, recipe, summary, FakeApi};
use tradesmith::api::GameApi;
use tradesmith::app::Advisor;
use tradesmith::config::Config;
use tradesmith::model::{Ingredient, ItemId};

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        cache_dir: dir.to_path_buf(),
        api_key: None,
        ..Config::default()
    }
}

fn scripted_api() -> Arc<FakeApi> {
    let api = FakeApi::new();
    *api.items.lock() = vec![item(10, "Widget"), item(20, "Widget Part")];
    *api.recipes.lock() = vec![recipe(1, 10, 1, vec![Ingredient::item(ItemId(20), 2)])];
    api.prices.lock().insert(ItemId(20), summary(20, 40, 50));
    Arc::new(api)
}

#[tokio::test]
async fn open_rebuilds_catalogs_once_per_build() {
    let dir = tempfile::tempdir().unwrap();
    let api = scripted_api();

    Advisor::with_api(test_config(dir.path()), Arc::clone(&api) as Arc<dyn GameApi>)
        .await
        .unwrap();
    assert_eq!(api.build_calls.load(Ordering::SeqCst), 1);
    assert!(api.item_calls.load(Ordering::SeqCst) > 0);

    // Same build, checked minutes ago: the second open trusts the disk.
    let items_fetched = api.item_calls.load(Ordering::SeqCst);
    Advisor::with_api(test_config(dir.path()), Arc::clone(&api) as Arc<dyn GameApi>)
        .await
        .unwrap();
    assert_eq!(api.build_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.item_calls.load(Ordering::SeqCst), items_fetched);
}

#[tokio::test]
async fn offline_mode_never_asks_for_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let api = scripted_api();
    let config = Config {
        offline: true,
        ..test_config(dir.path())
    };

    Advisor::with_api(config, Arc::clone(&api) as Arc<dyn GameApi>)
        .await
        .unwrap();
    assert_eq!(api.build_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.item_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stockpile_shortfall_plans_craft_and_ingredient_buys() {
    let dir = tempfile::tempdir().unwrap();
    let api = scripted_api();

    let mut advisor =
        Advisor::with_api(test_config(dir.path()), Arc::clone(&api) as Arc<dyn GameApi>)
            .await
            .unwrap();
    advisor.books().set_stockpile(ItemId(10), 2).unwrap();

    let report = advisor.plan().await.unwrap();
    // 10 is unlisted, so the only strategy is its recipe.
    assert_eq!(report.plan.craft_items.count(ItemId(10)), 2);
    assert_eq!(report.plan.buy_items.count(ItemId(20)), 4);
    assert_eq!(report.plan.buy_cost, dec!(200));
    assert_eq!(report.names[&ItemId(10)], "Widget");
    assert_eq!(report.names[&ItemId(20)], "Widget Part");
}

#[tokio::test]
async fn price_report_names_the_cheapest_path() {
    let dir = tempfile::tempdir().unwrap();
    let api = scripted_api();

    let mut advisor =
        Advisor::with_api(test_config(dir.path()), Arc::clone(&api) as Arc<dyn GameApi>)
            .await
            .unwrap();

    let report = advisor.price("Widget", None).await.unwrap();
    assert_eq!(report.item, ItemId(10));
    assert_eq!(report.best_offer, None);
    assert_eq!(report.strategy, "craft");
    // 2 x 50 via the recipe.
    assert_eq!(report.optimal_cost, Some(dec!(100)));

    let part = advisor.price("20", None).await.unwrap();
    assert_eq!(part.strategy, "buy");
    assert_eq!(part.best_bid, Some(dec!(40)));
    assert_eq!(part.optimal_cost, Some(dec!(50)));
}
