//! Unit of Work over mocked repositories for service unit tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{AppError, AppResult};
use crate::infra::{
    BlogRepository, MockBlogRepository, MockOrderRepository, MockProductRepository,
    MockProfileRepository, MockUserRepository, OrderRepository, ProductRepository,
    ProfileRepository, TransactionContext, UnitOfWork, UserRepository,
};

/// Repositories left at their default have no expectations and fail the
/// test if called.
pub(crate) struct TestUnitOfWork {
    pub users: Arc<MockUserRepository>,
    pub profiles: Arc<MockProfileRepository>,
    pub products: Arc<MockProductRepository>,
    pub orders: Arc<MockOrderRepository>,
    pub blog: Arc<MockBlogRepository>,
}

impl Default for TestUnitOfWork {
    fn default() -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            profiles: Arc::new(MockProfileRepository::new()),
            products: Arc::new(MockProductRepository::new()),
            orders: Arc::new(MockOrderRepository::new()),
            blog: Arc::new(MockBlogRepository::new()),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.profiles.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.products.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.orders.clone()
    }

    fn blog(&self) -> Arc<dyn BlogRepository> {
        self.blog.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Transactional paths are covered by the SQLite integration tests
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}
