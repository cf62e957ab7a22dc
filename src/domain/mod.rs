//! Domain layer - Core business entities and logic
//!
//! Shop (products, orders), accounts (users, profiles) and blog types,
//! independent of how they are stored or served.

pub mod blog;
pub mod order;
pub mod password;
pub mod product;
pub mod profile;
pub mod user;

pub use blog::{Article, ArticleSummary, Author, Category, NewArticle, Tag};
pub use order::{NewOrder, Order, OrderDetails, OrderFilter, OrderRecord, OrderSort, OrderView};
pub use password::Password;
pub use product::{Product, ProductDraft, ProductExport, ProductExportEntry, ProductQuery, ProductSort};
pub use profile::{Profile, ProfileChanges, ProfileResponse};
pub use user::{validate_username, User, UserResponse, UserRole};
