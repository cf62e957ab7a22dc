//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Each module converts its `Model` into the matching domain type.

pub mod article;
pub mod article_tag;
pub mod author;
pub mod category;
pub mod order;
pub mod order_product;
pub mod product;
pub mod profile;
pub mod tag;
pub mod user;
