//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheStore, Database};
use crate::services::{
    AuthService, BlogService, OrderService, ProductService, ServiceContainer, Services,
    UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub product_service: Arc<dyn ProductService>,
    pub order_service: Arc<dyn OrderService>,
    pub blog_service: Arc<dyn BlogService>,
    /// Cache shared with the order service
    pub cache: Arc<dyn CacheStore>,
    pub database: Arc<Database>,
    /// Body limit of the order import route
    pub import_max_bytes: usize,
}

impl AppState {
    /// Create application state from database, cache and config.
    pub fn from_config(database: Arc<Database>, cache: Arc<dyn CacheStore>, config: Config) -> Self {
        let import_max_bytes = config.import_max_bytes;
        let container = Services::from_connection(database.get_connection(), cache.clone(), config);

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            product_service: container.products(),
            order_service: container.orders(),
            blog_service: container.blog(),
            cache,
            database,
            import_max_bytes,
        }
    }
}
