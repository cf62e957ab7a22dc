//! Repository layer - Data access abstraction
//!
//! Each repository pairs a mockable trait with a store backed by the pooled
//! connection. The query bodies are free functions generic over
//! `ConnectionTrait`, so the transaction-scoped repositories in
//! `unit_of_work` run exactly the same SQL.

use sea_orm::{DbErr, SqlErr};

use crate::errors::AppError;

mod blog_repository;
pub(crate) mod entities;
mod order_repository;
mod product_repository;
mod profile_repository;
mod user_repository;

pub use blog_repository::{BlogRepository, BlogStore};
pub use order_repository::{OrderRepository, OrderStore};
pub use product_repository::{ProductRepository, ProductStore};
pub use profile_repository::{ProfileRepository, ProfileStore};
pub use user_repository::{UserRepository, UserStore};

pub(crate) use blog_repository::queries as blog_queries;
pub(crate) use order_repository::queries as order_queries;
pub(crate) use product_repository::queries as product_queries;
pub(crate) use profile_repository::queries as profile_queries;
pub(crate) use user_repository::queries as user_queries;

#[cfg(test)]
pub use blog_repository::MockBlogRepository;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
#[cfg(test)]
pub use product_repository::MockProductRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_or_db(err: DbErr, entity: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        _ => AppError::from(err),
    }
}
