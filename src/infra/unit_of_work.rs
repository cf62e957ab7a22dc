//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the transaction lifecycle: a
//! transaction is begun once, handed to the closure through a
//! [`TransactionContext`], and then committed or rolled back on a single
//! exit path.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    IsolationLevel, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::{
    blog_queries, order_queries, product_queries, profile_queries, user_queries, BlogRepository,
    BlogStore, OrderRepository, OrderStore, ProductRepository, ProductStore, ProfileRepository,
    ProfileStore, UserRepository, UserStore,
};
use crate::domain::{Article, NewArticle, Order, OrderDetails, Profile, User};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Note: This trait is not mockable directly due to the generic method.
/// Service tests implement it over mocked repositories instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn profiles(&self) -> Arc<dyn ProfileRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    fn blog(&self) -> Arc<dyn BlogRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed when the closure returns `Ok` and rolled
    /// back when it returns `Err`.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// Everything done through this context belongs to the same transaction.
/// Pooled repositories must not be used inside the closure.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn profiles(&self) -> TxProfileRepository<'_> {
        TxProfileRepository { txn: self.txn }
    }

    pub fn products(&self) -> TxProductRepository<'_> {
        TxProductRepository { txn: self.txn }
    }

    pub fn orders(&self) -> TxOrderRepository<'_> {
        TxOrderRepository { txn: self.txn }
    }

    pub fn blog(&self) -> TxBlogRepository<'_> {
        TxBlogRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    profile_repo: Arc<ProfileStore>,
    product_repo: Arc<ProductStore>,
    order_repo: Arc<OrderStore>,
    blog_repo: Arc<BlogStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            profile_repo: Arc::new(ProfileStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db.clone())),
            blog_repo: Arc::new(BlogStore::new(db.clone())),
            db,
        }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        // SQLite has no per-transaction isolation levels
        let txn = match self.db.get_database_backend() {
            DbBackend::Sqlite => self.db.begin().await,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::ReadCommitted),
                        Some(AccessMode::ReadWrite),
                    )
                    .await
            }
        };
        txn.map_err(AppError::from)
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn profiles(&self) -> Arc<dyn ProfileRepository> {
        self.profile_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    fn blog(&self) -> Arc<dyn BlogRepository> {
        self.blog_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self.begin().await?;
        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user repository.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        user_queries::find_by_id(self.txn, id).await
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        user_queries::find_by_username(self.txn, username).await
    }

    pub async fn create(
        &self,
        username: String,
        email: String,
        password_hash: String,
        is_staff: bool,
    ) -> AppResult<User> {
        user_queries::create(self.txn, username, email, password_hash, is_staff).await
    }
}

/// Transaction-aware profile repository.
pub struct TxProfileRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProfileRepository<'a> {
    /// Create the empty profile of a new user
    pub async fn create(&self, user_id: i32) -> AppResult<Profile> {
        profile_queries::create(self.txn, user_id).await
    }
}

/// Transaction-aware product repository.
pub struct TxProductRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxProductRepository<'a> {
    /// Keep only the IDs of products that exist
    pub async fn existing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        product_queries::existing_ids(self.txn, ids).await
    }
}

/// Transaction-aware order repository.
pub struct TxOrderRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxOrderRepository<'a> {
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<OrderDetails>> {
        order_queries::find_by_id(self.txn, id).await
    }

    pub async fn create(
        &self,
        delivery_address: String,
        promocode: String,
        user_id: i32,
    ) -> AppResult<Order> {
        order_queries::create(self.txn, delivery_address, promocode, user_id).await
    }

    pub async fn update(
        &self,
        id: i32,
        delivery_address: String,
        promocode: String,
        user_id: i32,
    ) -> AppResult<Order> {
        order_queries::update(self.txn, id, delivery_address, promocode, user_id).await
    }

    pub async fn add_products(&self, order_id: i32, product_ids: &[i32]) -> AppResult<()> {
        order_queries::add_products(self.txn, order_id, product_ids).await
    }

    pub async fn replace_products(&self, order_id: i32, product_ids: &[i32]) -> AppResult<()> {
        order_queries::replace_products(self.txn, order_id, product_ids).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        order_queries::delete(self.txn, id).await
    }
}

/// Transaction-aware blog repository.
pub struct TxBlogRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxBlogRepository<'a> {
    pub async fn create_article(&self, new_article: NewArticle) -> AppResult<Article> {
        blog_queries::create_article(self.txn, new_article).await
    }
}

/// Simpler API for executing transactional operations.
///
/// This helper macro reduces boilerplate when using transactions.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
