//! HTTP request handlers.

pub mod auth_handler;
pub mod blog_handler;
pub mod order_handler;
pub mod product_handler;
pub mod user_handler;

pub use auth_handler::auth_routes;
pub use blog_handler::blog_routes;
pub use order_handler::order_routes;
pub use product_handler::{product_public_routes, product_routes};
pub use user_handler::user_routes;
