//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion, and reach storage only through the Unit of Work.

mod auth_service;
mod blog_service;
pub mod container;
pub mod feed;
pub mod order_import;
mod order_service;
mod product_service;
mod user_service;

#[cfg(test)]
pub(crate) mod testing;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use blog_service::{BlogManager, BlogService};
pub use order_import::ImportReport;
pub use order_service::{export_cache_key, OrderManager, OrderService};
pub use product_service::{ProductManager, ProductService};
pub use user_service::{UserManager, UserService};
