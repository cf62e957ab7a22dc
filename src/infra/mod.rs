//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and repositories
//! - Unit of Work for transaction management
//! - Redis cache behind the `CacheStore` trait

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, CacheStore};
pub use db::{Database, Migrator};
pub use repositories::{
    BlogRepository, OrderRepository, ProductRepository, ProfileRepository, UserRepository,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(test)]
pub use cache::MockCacheStore;
#[cfg(test)]
pub use repositories::{
    MockBlogRepository, MockOrderRepository, MockProductRepository, MockProfileRepository,
    MockUserRepository,
};
