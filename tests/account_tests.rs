//! Account snapshot assembly and character caching.

mod support;

use std::sync::atomic::Ordering;

use support::FakeApi;
use tradesmith::account::{AccountSnapshot, CharacterCache};
use tradesmith::model::{
    Character, CurrencyId, CurrencyTable, Delivery, Discipline, InventorySlot, ItemId,
    MaterialSlot, WalletEntry,
};

fn scripted_api() -> FakeApi {
    let api = FakeApi::new();
    let character: Character = serde_json::from_str(
        r#"{"name": "Smith",
            "crafting": [{"discipline": "Weaponsmith", "rating": 400, "active": true}],
            "bags": [null, {"id": 9, "size": 4,
                "inventory": [null, {"id": 10, "count": 2}]}]}"#,
    )
    .unwrap();
    *api.characters.lock() = vec![character];
    *api.materials.lock() = vec![
        MaterialSlot {
            id: ItemId(10),
            category: 5,
            count: 3,
        },
        MaterialSlot {
            id: ItemId(11),
            category: 5,
            count: 0,
        },
    ];
    *api.bank.lock() = vec![
        None,
        Some(InventorySlot {
            id: ItemId(10),
            count: 1,
        }),
    ];
    *api.delivery.lock() = Delivery {
        coins: 123,
        items: vec![InventorySlot {
            id: ItemId(12),
            count: 4,
        }],
    };
    *api.wallet.lock() = vec![
        WalletEntry {
            id: CurrencyId(2),
            value: 500,
        },
        // Not part of the crafting bijection; invisible to planning.
        WalletEntry {
            id: CurrencyId(999),
            value: 50,
        },
    ];
    api
}

#[tokio::test]
async fn snapshot_sums_every_source() {
    let dir = tempfile::tempdir().unwrap();
    let api = scripted_api();
    let currencies = CurrencyTable::default();
    let mut characters = CharacterCache::open(dir.path()).unwrap();

    let snapshot = AccountSnapshot::assemble(&api, &mut characters, &currencies)
        .await
        .unwrap();

    // 2 carried + 3 materials + 1 bank.
    assert_eq!(snapshot.inventory.count(ItemId(10)), 6);
    assert_eq!(snapshot.inventory.count(ItemId(11)), 0);
    assert_eq!(snapshot.inventory.count(ItemId(12)), 4);

    let karma = currencies.item_for(CurrencyId(2)).unwrap();
    assert_eq!(snapshot.inventory.count(karma), 500);
    assert_eq!(snapshot.inventory.len(), 3);

    assert_eq!(snapshot.crafting.rating(Discipline::Weaponsmith), 400);
}

#[tokio::test]
async fn character_cache_fetches_once() {
    let dir = tempfile::tempdir().unwrap();
    let api = scripted_api();
    let currencies = CurrencyTable::default();
    let mut characters = CharacterCache::open(dir.path()).unwrap();

    AccountSnapshot::assemble(&api, &mut characters, &currencies)
        .await
        .unwrap();
    AccountSnapshot::assemble(&api, &mut characters, &currencies)
        .await
        .unwrap();
    assert_eq!(api.character_calls.load(Ordering::SeqCst), 1);

    characters.rebuild(&api).await.unwrap();
    assert_eq!(api.character_calls.load(Ordering::SeqCst), 2);
}
