//! Shared fixtures: an in-memory SQLite database with migrations applied and
//! an in-process cache with a manually advanced clock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sea_orm::ConnectionTrait;

use mysite::api::AppState;
use mysite::config::Config;
use mysite::domain::{OrderFilter, Product, ProductDraft, User};
use mysite::errors::AppResult;
use mysite::infra::{CacheStore, Database};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> Config {
    Config::new("sqlite::memory:", "test-secret-key-for-testing-only-32chars")
}

// =============================================================================
// In-memory cache
// =============================================================================

/// `CacheStore` whose entries expire against a clock moved by [`MemoryCache::advance`].
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, u64)>>,
    now: AtomicU64,
    pub sets: AtomicUsize,
}

impl MemoryCache {
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|(value, _)| value.clone())
    }

    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let now = self.now.load(Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> AppResult<()> {
        let expires_at = self.now.load(Ordering::SeqCst) + ttl_seconds;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, expires_at));
        self.sets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

// =============================================================================
// Application fixture
// =============================================================================

pub struct TestApp {
    pub db: Arc<Database>,
    pub cache: Arc<MemoryCache>,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Arc::new(Database::in_memory().await.expect("in-memory database"));
        let cache = Arc::new(MemoryCache::default());
        let state = AppState::from_config(db.clone(), cache.clone(), test_config());
        Self { db, cache, state }
    }

    pub async fn user(&self, username: &str) -> User {
        self.state
            .auth_service
            .register(
                username.to_string(),
                TEST_PASSWORD.to_string(),
                format!("{}@example.com", username),
            )
            .await
            .expect("register user")
    }

    pub async fn staff(&self, username: &str) -> User {
        let user = self.user(username).await;
        self.db
            .connection()
            .execute_unprepared(&format!(
                "UPDATE users SET is_staff = 1 WHERE id = {}",
                user.id
            ))
            .await
            .expect("promote to staff");
        user
    }

    /// Account with a fixed primary key, cloned from an already registered user.
    pub async fn user_with_id(&self, id: i32, username: &str) {
        self.db
            .connection()
            .execute_unprepared(&format!(
                "INSERT INTO users (id, username, email, password_hash, first_name, last_name, is_staff, created_at) \
                 SELECT {}, '{}', email, password_hash, first_name, last_name, 0, created_at FROM users LIMIT 1",
                id, username
            ))
            .await
            .expect("insert user");
    }

    /// Products 1..=count in id order.
    pub async fn products(&self, count: usize) -> Vec<Product> {
        let mut products = Vec::with_capacity(count);
        for n in 1..=count {
            products.push(self.product(&format!("Product {}", n)).await);
        }
        products
    }

    pub async fn delete_product(&self, id: i32) {
        self.db
            .connection()
            .execute_unprepared(&format!("DELETE FROM products WHERE id = {}", id))
            .await
            .expect("delete product");
    }

    pub async fn product(&self, name: &str) -> Product {
        self.state
            .product_service
            .create_product(ProductDraft {
                name: name.to_string(),
                description: format!("{} description", name),
                price: 10.0,
                discount: 0,
            })
            .await
            .expect("create product")
    }

    pub async fn order_count(&self) -> usize {
        self.state
            .order_service
            .list_orders(OrderFilter::default())
            .await
            .expect("list orders")
            .len()
    }

    pub async fn token(&self, username: &str) -> String {
        self.state
            .auth_service
            .login(username.to_string(), TEST_PASSWORD.to_string())
            .await
            .expect("login")
            .access_token
    }
}
