//! mysite - shop, accounts and blog behind one HTTP API
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Use cases: auth, profiles, products, orders (CSV import, cached export), blog
//! - **infra**: Database, migrations, repositories, unit of work and Redis cache
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (ordering, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Import orders from a CP1251 file
//! cargo run -- import-orders orders.csv --encoding windows-1251
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::{Cache, CacheStore};
