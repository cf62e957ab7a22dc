//! CSV order import against a real database.

mod common;

use common::TestApp;
use mysite::domain::{OrderFilter, OrderView};
use mysite::errors::AppError;

const HEADER: &str = "delivery_address,promocode,user,products\n";

async fn import(app: &TestApp, csv: &str) -> Result<usize, AppError> {
    app.state
        .order_service
        .import_orders(csv.as_bytes().to_vec(), "utf-8".to_string())
        .await
        .map(|report| report.created)
}

async fn all_orders(app: &TestApp) -> Vec<OrderView> {
    app.state
        .order_service
        .list_orders(OrderFilter::default())
        .await
        .unwrap()
}

fn product_ids(order: &OrderView) -> Vec<i32> {
    order.products.iter().map(|p| p.id).collect()
}

// =============================================================================
// Successful imports
// =============================================================================

#[tokio::test]
async fn test_each_row_becomes_one_order() {
    let app = TestApp::new().await;
    let alice = app.user("alice").await;
    app.products(3).await;

    let csv = format!(
        "{h}1 First St,,{u},1\n2 Second St,SALE,{u},\"1,2\"\n3 Third St,,{u},3\n",
        h = HEADER,
        u = alice.id
    );
    let created = import(&app, &csv).await.unwrap();

    assert_eq!(created, 3);
    let orders = all_orders(&app).await;
    assert_eq!(orders.len(), 3);
    assert_eq!(orders[0].delivery_address, "1 First St");
    assert_eq!(product_ids(&orders[0]), vec![1]);
    assert_eq!(orders[1].promocode, "SALE");
    assert_eq!(product_ids(&orders[1]), vec![1, 2]);
    assert_eq!(product_ids(&orders[2]), vec![3]);
    assert!(orders.iter().all(|o| o.user.id == alice.id));
}

#[tokio::test]
async fn test_unquoted_product_list_drops_missing_products() {
    let app = TestApp::new().await;
    app.user("first").await;
    app.user_with_id(7, "seven").await;
    app.products(9).await;
    app.delete_product(5).await;

    let csv = format!("{}123 Main St,PROMO5,7,3,5,9\n", HEADER);
    let created = import(&app, &csv).await.unwrap();

    assert_eq!(created, 1);
    let orders = all_orders(&app).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].user.id, 7);
    assert_eq!(orders[0].delivery_address, "123 Main St");
    assert_eq!(orders[0].promocode, "PROMO5");
    assert_eq!(product_ids(&orders[0]), vec![3, 9]);
}

#[tokio::test]
async fn test_empty_products_and_duplicates() {
    let app = TestApp::new().await;
    let bob = app.user("bob").await;
    app.products(2).await;

    let csv = format!(
        "{h}Nowhere,,{u},\nTwice,,{u},\"2,2,1,2\"\n",
        h = HEADER,
        u = bob.id
    );
    assert_eq!(import(&app, &csv).await.unwrap(), 2);

    let orders = all_orders(&app).await;
    assert!(orders[0].products.is_empty());
    assert_eq!(product_ids(&orders[1]), vec![1, 2]);
}

#[tokio::test]
async fn test_importing_twice_doubles_the_orders() {
    let app = TestApp::new().await;
    let carol = app.user("carol").await;
    app.products(1).await;

    let csv = format!("{h}A,,{u},1\nB,,{u},1\n", h = HEADER, u = carol.id);
    import(&app, &csv).await.unwrap();
    import(&app, &csv).await.unwrap();

    assert_eq!(app.order_count().await, 4);
}

#[tokio::test]
async fn test_cp1251_file() {
    let app = TestApp::new().await;
    let dave = app.user("dave").await;

    let csv = format!("{}Москва,,{},\n", HEADER, dave.id);
    let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(&csv);
    let report = app
        .state
        .order_service
        .import_orders(bytes.into_owned(), "cp1251".to_string())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(all_orders(&app).await[0].delivery_address, "Москва");
}

// =============================================================================
// Rejected imports leave nothing behind
// =============================================================================

#[tokio::test]
async fn test_unknown_user_in_row_three_rolls_back_everything() {
    let app = TestApp::new().await;
    let erin = app.user("erin").await;
    app.products(1).await;

    let csv = format!(
        "{h}A,,{u},1\nB,,{u},1\nC,,999,1\nD,,{u},1\nE,,{u},1\n",
        h = HEADER,
        u = erin.id
    );
    let err = import(&app, &csv).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::ReferenceNotFound { row: 3, entity: "user", id: 999 }
    ));
    assert_eq!(app.order_count().await, 0);
}

#[tokio::test]
async fn test_malformed_row_creates_nothing() {
    let app = TestApp::new().await;
    let frank = app.user("frank").await;

    let csv = format!("{h}A,,{u},\nB,,not-a-user,\n", h = HEADER, u = frank.id);
    let err = import(&app, &csv).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRow { row: 2, .. }));
    assert_eq!(app.order_count().await, 0);
}

#[tokio::test]
async fn test_undecodable_file_creates_nothing() {
    let app = TestApp::new().await;
    app.user("grace").await;

    let mut bytes = HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(b"\xff\xfe,,1,\n");
    let err = app
        .state
        .order_service
        .import_orders(bytes, "utf-8".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Encoding(_)));
    assert_eq!(app.order_count().await, 0);
}

#[tokio::test]
async fn test_overlong_promocode_creates_nothing() {
    let app = TestApp::new().await;
    let heidi = app.user("heidi").await;

    let csv = format!(
        "{h}A,SHORT,{u},\nB,{code},{u},\n",
        h = HEADER,
        u = heidi.id,
        code = "P".repeat(25)
    );
    let err = import(&app, &csv).await.unwrap_err();

    assert!(matches!(err, AppError::MalformedRow { row: 2, .. }));
    assert_eq!(app.order_count().await, 0);
}
