//! Order CRUD, order filters and product search against a real database.

mod common;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
};
use tower::ServiceExt;

use common::TestApp;
use mysite::api::create_router;
use mysite::domain::{NewOrder, OrderFilter, OrderSort, ProductDraft, ProductQuery, ProductSort};
use mysite::errors::AppError;
use mysite::types::Ordering;

fn new_order(user_id: i32, address: &str, promocode: &str, products: Vec<i32>) -> NewOrder {
    NewOrder {
        delivery_address: address.to_string(),
        promocode: promocode.to_string(),
        user_id,
        product_ids: products,
    }
}

fn pks(orders: &[mysite::domain::OrderView]) -> Vec<i32> {
    orders.iter().map(|o| o.pk).collect()
}

// =============================================================================
// Update and delete
// =============================================================================

#[tokio::test]
async fn test_update_replaces_fields_and_products() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    app.products(3).await;
    let orders = &app.state.order_service;

    let created = orders
        .create_order(new_order(alice.id, "Old St", "", vec![1, 2]))
        .await
        .unwrap();

    let updated = orders
        .update_order(created.pk, new_order(bob.id, "New St", "SAVE10", vec![3, 77]))
        .await
        .unwrap();

    assert_eq!(updated.pk, created.pk);
    assert_eq!(updated.delivery_address, "New St");
    assert_eq!(updated.promocode, "SAVE10");
    assert_eq!(updated.user.id, bob.id);
    let product_ids: Vec<i32> = updated.products.iter().map(|p| p.id).collect();
    assert_eq!(product_ids, vec![3]);

    let reloaded = orders.get_order(created.pk).await.unwrap();
    assert_eq!(reloaded.products.len(), 1);
    assert_eq!(reloaded.created_at, created.created_at);
}

#[tokio::test]
async fn test_update_errors_leave_order_untouched() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let orders = &app.state.order_service;

    let created = orders
        .create_order(new_order(alice.id, "Old St", "", vec![]))
        .await
        .unwrap();

    let err = orders
        .update_order(created.pk, new_order(999, "New St", "", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(orders.get_order(created.pk).await.unwrap().delivery_address, "Old St");

    let err = orders
        .update_order(created.pk + 100, new_order(alice.id, "X", "", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_delete_removes_order_once() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    app.products(1).await;
    let orders = &app.state.order_service;

    let created = orders
        .create_order(new_order(alice.id, "Gone St", "", vec![1]))
        .await
        .unwrap();

    orders.delete_order(created.pk).await.unwrap();

    assert!(matches!(orders.get_order(created.pk).await, Err(AppError::NotFound)));
    assert!(matches!(orders.delete_order(created.pk).await, Err(AppError::NotFound)));
    assert_eq!(app.order_count().await, 0);
    // Products survive their orders
    assert!(app.state.product_service.get_product(1).await.is_ok());
}

#[tokio::test]
async fn test_delete_over_http_returns_no_content() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let token = app.token("alice").await;
    let created = app
        .state
        .order_service
        .create_order(new_order(alice.id, "Gone St", "", vec![]))
        .await
        .unwrap();

    let delete = |token: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/shop/orders/{}", created.pk))
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let response = create_router(app.state.clone())
        .oneshot(delete(&token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = create_router(app.state.clone())
        .oneshot(delete(&token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Listing filters and ordering
// =============================================================================

#[tokio::test]
async fn test_order_filters_are_exact_matches() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let orders = &app.state.order_service;

    let a1 = orders.create_order(new_order(alice.id, "Main St", "SALE", vec![])).await.unwrap();
    let a2 = orders.create_order(new_order(alice.id, "Main St 2", "", vec![])).await.unwrap();
    let b1 = orders.create_order(new_order(bob.id, "Main St", "", vec![])).await.unwrap();

    let by_user = orders
        .list_orders(OrderFilter { user_id: Some(alice.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(pks(&by_user), vec![a1.pk, a2.pk]);

    let by_address = orders
        .list_orders(OrderFilter {
            delivery_address: Some("Main St".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pks(&by_address), vec![a1.pk, b1.pk]);

    let by_promocode = orders
        .list_orders(OrderFilter { promocode: Some("SALE".into()), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(pks(&by_promocode), vec![a1.pk]);

    let combined = orders
        .list_orders(OrderFilter {
            delivery_address: Some("Main St".into()),
            user_id: Some(bob.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pks(&combined), vec![b1.pk]);
}

#[tokio::test]
async fn test_order_listing_ordering() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    let orders = &app.state.order_service;

    let c = orders.create_order(new_order(alice.id, "C St", "", vec![])).await.unwrap();
    let a = orders.create_order(new_order(alice.id, "A St", "", vec![])).await.unwrap();
    let b = orders.create_order(new_order(alice.id, "B St", "", vec![])).await.unwrap();

    let newest_first = orders
        .list_orders(OrderFilter {
            ordering: Ordering { field: OrderSort::Pk, descending: true },
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pks(&newest_first), vec![b.pk, a.pk, c.pk]);

    let by_address = orders
        .list_orders(OrderFilter {
            ordering: Ordering::parse("delivery_address").unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pks(&by_address), vec![a.pk, b.pk, c.pk]);
}

// =============================================================================
// Product search
// =============================================================================

#[tokio::test]
async fn test_product_search_and_ordering() {
    let app = TestApp::new().await;
    let products = &app.state.product_service;

    let draft = |name: &str, description: &str, price: f64| ProductDraft {
        name: name.to_string(),
        description: description.to_string(),
        price,
        discount: 0,
    };
    let laptop = products.create_product(draft("Laptop", "Portable", 1500.0)).await.unwrap();
    let desktop = products.create_product(draft("Desktop", "Not a Laptop", 900.0)).await.unwrap();
    let mouse = products.create_product(draft("Mouse", "Wireless", 25.0)).await.unwrap();
    let old = products.create_product(draft("Old Laptop", "", 100.0)).await.unwrap();
    products.archive_product(old.id).await.unwrap();

    let found = products
        .list_products(ProductQuery {
            search: Some("Laptop".into()),
            ordering: Ordering { field: ProductSort::Price, descending: true },
        })
        .await
        .unwrap();
    let ids: Vec<i32> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![laptop.id, desktop.id]);

    let everything = products.list_products(ProductQuery::default()).await.unwrap();
    let ids: Vec<i32> = everything.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![laptop.id, desktop.id, mouse.id]);
}
