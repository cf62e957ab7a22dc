//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits; `Services` wires the concrete
//! implementations to one shared Unit of Work and cache.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, BlogManager, BlogService, OrderManager, OrderService,
    ProductManager, ProductService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{CacheStore, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn products(&self) -> Arc<dyn ProductService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn blog(&self) -> Arc<dyn BlogService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    product_service: Arc<dyn ProductService>,
    order_service: Arc<dyn OrderService>,
    blog_service: Arc<dyn BlogService>,
}

impl Services {
    /// Create service container from database connection, cache and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        cache: Arc<dyn CacheStore>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let export_ttl = config.order_export_ttl_seconds;

        Self {
            user_service: Arc::new(UserManager::new(uow.clone())),
            product_service: Arc::new(ProductManager::new(uow.clone())),
            order_service: Arc::new(OrderManager::new(uow.clone(), cache, export_ttl)),
            blog_service: Arc::new(BlogManager::new(uow.clone())),
            auth_service: Arc::new(Authenticator::new(uow, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn products(&self) -> Arc<dyn ProductService> {
        self.product_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn blog(&self) -> Arc<dyn BlogService> {
        self.blog_service.clone()
    }
}
