//! Order service - Order CRUD, CSV import and the cached per-user export.
//!
//! The export payload is cached as the serialized JSON string under
//! `user_orders_{id}`, so a hit returns exactly the bytes stored by the
//! miss that filled it. Two concurrent misses may both compute and store
//! the payload; the last write wins.

use async_trait::async_trait;
use std::sync::Arc;

use super::order_import::{self, ImportReport};
use crate::config::CACHE_PREFIX_USER_ORDERS;
use crate::domain::{NewOrder, OrderFilter, OrderRecord, OrderView};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{CacheStore, TransactionContext, UnitOfWork};
use crate::with_transaction;

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<OrderView>>;

    async fn get_order(&self, id: i32) -> AppResult<OrderView>;

    /// Create an order. Unknown product IDs are dropped.
    async fn create_order(&self, new_order: NewOrder) -> AppResult<OrderView>;

    /// Replace an order's fields and products
    async fn update_order(&self, id: i32, changes: NewOrder) -> AppResult<OrderView>;

    async fn delete_order(&self, id: i32) -> AppResult<()>;

    /// A user's orders, newest first, uncached
    async fn list_user_orders(&self, user_id: i32) -> AppResult<Vec<OrderView>>;

    /// A user's orders as a JSON array of order records, cached
    async fn export_user_orders(&self, user_id: i32) -> AppResult<String>;

    /// Create one order per CSV row, all or nothing
    async fn import_orders(&self, data: Vec<u8>, encoding: String) -> AppResult<ImportReport>;
}

pub struct OrderManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: Arc<dyn CacheStore>,
    export_ttl_seconds: u64,
}

impl<U: UnitOfWork> OrderManager<U> {
    pub fn new(uow: Arc<U>, cache: Arc<dyn CacheStore>, export_ttl_seconds: u64) -> Self {
        Self {
            uow,
            cache,
            export_ttl_seconds,
        }
    }
}

/// Cache key of a user's order export.
pub fn export_cache_key(user_id: i32) -> String {
    format!("{}{}", CACHE_PREFIX_USER_ORDERS, user_id)
}

/// Store the order and its products, then read it back with relations.
async fn save_order(
    ctx: &TransactionContext<'_>,
    existing: Option<i32>,
    order: NewOrder,
) -> AppResult<OrderView> {
    if ctx.users().find_by_id(order.user_id).await?.is_none() {
        return Err(AppError::validation(format!(
            "User {} does not exist",
            order.user_id
        )));
    }
    let product_ids = ctx.products().existing_ids(&order.product_ids).await?;

    let order_id = match existing {
        Some(id) => {
            ctx.orders()
                .update(id, order.delivery_address, order.promocode, order.user_id)
                .await?;
            ctx.orders().replace_products(id, &product_ids).await?;
            id
        }
        None => {
            let created = ctx
                .orders()
                .create(order.delivery_address, order.promocode, order.user_id)
                .await?;
            ctx.orders().add_products(created.id, &product_ids).await?;
            created.id
        }
    };

    let details = ctx.orders().find_by_id(order_id).await?.ok_or_not_found()?;
    Ok(OrderView::from(details))
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderManager<U> {
    async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<OrderView>> {
        let orders = self.uow.orders().list(filter).await?;
        Ok(orders.into_iter().map(OrderView::from).collect())
    }

    async fn get_order(&self, id: i32) -> AppResult<OrderView> {
        let details = self.uow.orders().find_by_id(id).await?.ok_or_not_found()?;
        Ok(OrderView::from(details))
    }

    async fn create_order(&self, new_order: NewOrder) -> AppResult<OrderView> {
        let view = with_transaction!(self.uow, |ctx| save_order(&ctx, None, new_order).await)?;
        tracing::info!(order_id = view.pk, user_id = view.user.id, "Order created");
        Ok(view)
    }

    async fn update_order(&self, id: i32, changes: NewOrder) -> AppResult<OrderView> {
        with_transaction!(self.uow, |ctx| {
            ctx.orders().find_by_id(id).await?.ok_or_not_found()?;
            save_order(&ctx, Some(id), changes).await
        })
    }

    async fn delete_order(&self, id: i32) -> AppResult<()> {
        with_transaction!(self.uow, |ctx| ctx.orders().delete(id).await)?;
        tracing::info!(order_id = id, "Order deleted");
        Ok(())
    }

    async fn list_user_orders(&self, user_id: i32) -> AppResult<Vec<OrderView>> {
        self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;
        let orders = self.uow.orders().list_for_user(user_id).await?;
        Ok(orders.into_iter().map(OrderView::from).collect())
    }

    async fn export_user_orders(&self, user_id: i32) -> AppResult<String> {
        let key = export_cache_key(user_id);

        match self.cache.get(&key).await {
            Ok(Some(payload)) => {
                tracing::info!(user_id, "Order export cache hit");
                return Ok(payload);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Order export cache read failed");
            }
        }

        tracing::info!(user_id, "Order export cache miss");
        self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;

        let orders = self.uow.orders().list_for_user(user_id).await?;
        let records: Vec<OrderRecord> = orders.iter().map(OrderRecord::from).collect();
        let payload = serde_json::to_string(&records)
            .map_err(|e| AppError::internal(format!("Order export serialization failed: {}", e)))?;

        if let Err(e) = self
            .cache
            .set(&key, payload.clone(), self.export_ttl_seconds)
            .await
        {
            tracing::warn!(user_id, error = %e, "Order export cache write failed");
        }

        Ok(payload)
    }

    async fn import_orders(&self, data: Vec<u8>, encoding: String) -> AppResult<ImportReport> {
        let text = order_import::decode(&data, &encoding)?;
        let rows = order_import::parse_rows(&text)?;
        tracing::debug!(rows = rows.len(), encoding = %encoding, "Order import parsed");

        let created = with_transaction!(self.uow, |ctx| {
            let mut created: usize = 0;
            for row in rows {
                if ctx.users().find_by_id(row.user_id).await?.is_none() {
                    return Err(AppError::ReferenceNotFound {
                        row: row.row,
                        entity: "user",
                        id: row.user_id,
                    });
                }

                let product_ids = ctx.products().existing_ids(&row.product_ids).await?;
                if product_ids.len() < row.product_ids.len() {
                    tracing::debug!(
                        row = row.row,
                        requested = ?row.product_ids,
                        found = ?product_ids,
                        "Unknown products dropped"
                    );
                }

                let order = ctx
                    .orders()
                    .create(row.delivery_address, row.promocode, row.user_id)
                    .await?;
                ctx.orders().add_products(order.id, &product_ids).await?;
                created += 1;
            }
            Ok(created)
        })?;

        tracing::info!(created, "Orders imported from CSV");
        Ok(ImportReport { created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderDetails, Product, User, UserRole};
    use crate::infra::{MockCacheStore, MockOrderRepository, MockUserRepository};
    use crate::services::testing::TestUnitOfWork;
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;

    fn user(id: i32) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: String::new(),
            password_hash: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: UserRole::User,
            created_at: Utc::now(),
        }
    }

    fn details(id: i32, user_id: i32, product_ids: &[i32]) -> OrderDetails {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, id as u32).unwrap();
        OrderDetails {
            order: Order {
                id,
                delivery_address: "123 Main St".into(),
                promocode: String::new(),
                created_at,
                user_id,
            },
            user: user(user_id),
            products: product_ids
                .iter()
                .map(|&pid| Product {
                    id: pid,
                    name: format!("p{}", pid),
                    description: String::new(),
                    price: 1.0,
                    discount: 0,
                    created_at,
                    archived: false,
                })
                .collect(),
        }
    }

    fn service(
        users: MockUserRepository,
        orders: MockOrderRepository,
        cache: MockCacheStore,
    ) -> OrderManager<TestUnitOfWork> {
        let uow = TestUnitOfWork {
            users: Arc::new(users),
            orders: Arc::new(orders),
            ..Default::default()
        };
        OrderManager::new(Arc::new(uow), Arc::new(cache), 300)
    }

    #[tokio::test]
    async fn test_export_hit_skips_queries() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_get()
            .with(eq("user_orders_7"))
            .returning(|_| Ok(Some("[{\"pk\":1}]".to_string())));
        cache.expect_set().never();

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();
        let mut orders = MockOrderRepository::new();
        orders.expect_list_for_user().never();

        let payload = service(users, orders, cache).export_user_orders(7).await.unwrap();
        assert_eq!(payload, "[{\"pk\":1}]");
    }

    #[tokio::test]
    async fn test_export_miss_queries_and_stores() {
        let mut cache = MockCacheStore::new();
        cache.expect_get().returning(|_| Ok(None));
        cache
            .expect_set()
            .withf(|key, _, ttl| key == "user_orders_7" && *ttl == 300)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        let mut orders = MockOrderRepository::new();
        orders
            .expect_list_for_user()
            .with(eq(7))
            .times(1)
            .returning(|uid| Ok(vec![details(2, uid, &[3, 9]), details(1, uid, &[])]));

        let payload = service(users, orders, cache).export_user_orders(7).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json[0]["pk"], 2);
        assert_eq!(json[0]["user"], 7);
        assert_eq!(json[0]["products"], serde_json::json!([3, 9]));
        assert_eq!(json[1]["products"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_export_unknown_user_is_not_cached() {
        let mut cache = MockCacheStore::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_set().never();

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let result = service(users, MockOrderRepository::new(), cache)
            .export_user_orders(404)
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_export_survives_cache_outage() {
        let mut cache = MockCacheStore::new();
        cache
            .expect_get()
            .returning(|_| Err(AppError::internal("Cache error: connection refused")));
        cache
            .expect_set()
            .returning(|_, _, _| Err(AppError::internal("Cache error: connection refused")));

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| Ok(Some(user(id))));
        let mut orders = MockOrderRepository::new();
        orders
            .expect_list_for_user()
            .returning(|uid| Ok(vec![details(1, uid, &[5])]));

        let payload = service(users, orders, cache).export_user_orders(3).await.unwrap();
        assert!(payload.contains("\"products\":[5]"));
    }

    #[tokio::test]
    async fn test_import_rejects_bad_input_before_opening_a_transaction() {
        let svc = service(
            MockUserRepository::new(),
            MockOrderRepository::new(),
            MockCacheStore::new(),
        );

        let result = svc
            .import_orders(b"delivery_address,promocode,user,products\n".to_vec(), "klingon".into())
            .await;
        assert!(matches!(result, Err(AppError::Encoding(_))));

        let result = svc
            .import_orders(
                b"delivery_address,promocode,user,products\nA,,seven,1\n".to_vec(),
                "utf-8".into(),
            )
            .await;
        assert!(matches!(result, Err(AppError::MalformedRow { row: 1, .. })));
    }
}
