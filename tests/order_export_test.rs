//! Cached per-user order export against a real database.

mod common;

use common::TestApp;
use mysite::domain::{NewOrder, OrderRecord};
use mysite::errors::AppError;
use mysite::services::export_cache_key;

async fn place_order(app: &TestApp, user_id: i32, address: &str, products: Vec<i32>) -> i32 {
    app.state
        .order_service
        .create_order(NewOrder {
            delivery_address: address.to_string(),
            promocode: String::new(),
            user_id,
            product_ids: products,
        })
        .await
        .unwrap()
        .pk
}

#[tokio::test]
async fn test_second_call_within_ttl_is_served_from_cache() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    app.products(2).await;
    place_order(&app, alice.id, "1 First St", vec![2, 1]).await;

    let first = app.state.order_service.export_user_orders(alice.id).await.unwrap();
    assert_eq!(app.cache.set_count(), 1);
    assert_eq!(app.cache.raw(&export_cache_key(alice.id)).as_deref(), Some(first.as_str()));

    // Not visible until the entry expires
    place_order(&app, alice.id, "2 Second St", vec![]).await;

    let second = app.state.order_service.export_user_orders(alice.id).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(app.cache.set_count(), 1);

    let records: Vec<OrderRecord> = serde_json::from_str(&first).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user, alice.id);
    assert_eq!(records[0].products, vec![1, 2]);
}

#[tokio::test]
async fn test_expired_entry_is_rebuilt_with_new_orders() {
    let app = TestApp::new().await;
    let bob = app.user("bob").await;
    let older = place_order(&app, bob.id, "Old Rd", vec![]).await;

    let first = app.state.order_service.export_user_orders(bob.id).await.unwrap();
    let newer = place_order(&app, bob.id, "New Rd", vec![]).await;

    app.cache.advance(301);

    let refreshed = app.state.order_service.export_user_orders(bob.id).await.unwrap();
    assert_ne!(refreshed, first);
    assert_eq!(app.cache.set_count(), 2);

    let records: Vec<OrderRecord> = serde_json::from_str(&refreshed).unwrap();
    let pks: Vec<i32> = records.iter().map(|r| r.pk).collect();
    assert_eq!(pks, vec![newer, older]);
}

#[tokio::test]
async fn test_entry_still_valid_just_before_ttl() {
    let app = TestApp::new().await;
    let carol = app.user("carol").await;

    let first = app.state.order_service.export_user_orders(carol.id).await.unwrap();
    assert_eq!(first, "[]");

    place_order(&app, carol.id, "Somewhere", vec![]).await;
    app.cache.advance(299);

    let second = app.state.order_service.export_user_orders(carol.id).await.unwrap();
    assert_eq!(second, "[]");
}

#[tokio::test]
async fn test_unknown_user_is_never_cached() {
    let app = TestApp::new().await;
    app.user("dave").await;

    let err = app.state.order_service.export_user_orders(999).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound));
    assert!(app.cache.raw(&export_cache_key(999)).is_none());
    assert_eq!(app.cache.set_count(), 0);
}

#[tokio::test]
async fn test_exports_are_per_user() {
    let app = TestApp::new().await;
    let erin = app.user("erin").await;
    let frank = app.user("frank").await;
    place_order(&app, erin.id, "Erin St", vec![]).await;

    let erins = app.state.order_service.export_user_orders(erin.id).await.unwrap();
    let franks = app.state.order_service.export_user_orders(frank.id).await.unwrap();

    assert_eq!(franks, "[]");
    assert_ne!(erins, franks);
    assert_eq!(export_cache_key(erin.id), format!("user_orders_{}", erin.id));
}
