//! Catalog rebuild and persistence against a scripted API.

mod support;

use std::sync::atomic::Ordering;

use support::{item, recipe, FakeApi};
use tradesmith::catalog::{BuildGuard, ItemCatalog, NameQuery, RecipeCatalog};
use tradesmith::model::{Ingredient, ItemId, RecipeId};

#[tokio::test]
async fn item_rebuild_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeApi::new();
    *api.items.lock() = vec![item(10, "Widget"), item(20, "Widget Part")];

    {
        let mut catalog = ItemCatalog::open(dir.path()).unwrap();
        catalog.rebuild(&api).await.unwrap();
        assert_eq!(catalog.len(), 2);
    }

    // A fresh open replays the on-disk log; no API involved.
    let catalog = ItemCatalog::open(dir.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(ItemId(10)).unwrap().unwrap().name, "Widget");
    assert_eq!(
        catalog.search_name("Widget Part", &NameQuery::default()).unwrap(),
        ItemId(20)
    );
}

#[tokio::test]
async fn rebuild_discards_stale_records() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeApi::new();
    *api.items.lock() = vec![item(10, "Widget")];

    let mut catalog = ItemCatalog::open(dir.path()).unwrap();
    catalog.rebuild(&api).await.unwrap();

    *api.items.lock() = vec![item(30, "Sprocket")];
    catalog.rebuild(&api).await.unwrap();

    assert!(!catalog.contains(ItemId(10)));
    assert!(catalog.contains(ItemId(30)));
    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn recipe_rebuild_indexes_by_output() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeApi::new();
    *api.recipes.lock() = vec![
        recipe(5, 10, 1, vec![Ingredient::item(ItemId(20), 2)]),
        recipe(3, 10, 1, vec![Ingredient::item(ItemId(21), 1)]),
        recipe(4, 99, 1, vec![]),
    ];

    let mut catalog = RecipeCatalog::open(dir.path()).unwrap();
    catalog.rebuild(&api).await.unwrap();

    assert_eq!(catalog.search_output(ItemId(10)), &[RecipeId(3), RecipeId(5)]);
    assert!(catalog.search_output(ItemId(20)).is_empty());

    let reopened = RecipeCatalog::open(dir.path()).unwrap();
    assert_eq!(reopened.search_output(ItemId(10)), &[RecipeId(3), RecipeId(5)]);
}

#[tokio::test]
async fn fresh_build_record_suppresses_the_api_check() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeApi::new();
    let guard = BuildGuard::new(dir.path());

    // No record at all: the current build comes back as a rebuild target.
    assert_eq!(
        guard.needs_rebuild(&api, false).await.unwrap(),
        Some(100_000)
    );
    assert_eq!(api.build_calls.load(Ordering::SeqCst), 1);

    // A record written moments ago is trusted without asking upstream.
    guard.record(100_000).unwrap();
    assert_eq!(guard.needs_rebuild(&api, false).await.unwrap(), None);
    assert_eq!(api.build_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn offline_never_checks_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let api = FakeApi::new();
    let guard = BuildGuard::new(dir.path());

    assert_eq!(guard.needs_rebuild(&api, true).await.unwrap(), None);
    assert_eq!(api.build_calls.load(Ordering::SeqCst), 0);
}
