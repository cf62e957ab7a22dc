//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, blog_handler, order_handler, product_handler, user_handler,
};
use crate::domain::{
    Article, ArticleSummary, Author, Category, OrderRecord, OrderView, Product, ProductExport,
    ProductExportEntry, ProfileResponse, Tag, UserResponse, UserRole,
};
use crate::services::TokenResponse;

/// OpenAPI documentation for mysite
#[derive(OpenApi)]
#[openapi(
    info(
        title = "mysite",
        version = "0.1.0",
        description = "Shop, accounts and blog API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Accounts
        auth_handler::register,
        auth_handler::login,
        user_handler::about_me,
        user_handler::update_about_me,
        user_handler::list_users,
        user_handler::get_profile,
        user_handler::update_profile,
        // Products
        product_handler::list_products,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::archive_product,
        product_handler::archive_products,
        product_handler::unarchive_products,
        product_handler::export_products,
        product_handler::latest_feed,
        // Orders
        order_handler::list_orders,
        order_handler::create_order,
        order_handler::get_order,
        order_handler::update_order,
        order_handler::delete_order,
        order_handler::import_orders,
        order_handler::list_user_orders,
        order_handler::export_user_orders,
        // Blog
        blog_handler::list_articles,
        blog_handler::create_article,
        blog_handler::create_author,
        blog_handler::create_category,
        blog_handler::create_tag,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            ProfileResponse,
            TokenResponse,
            Product,
            ProductExport,
            ProductExportEntry,
            OrderRecord,
            OrderView,
            Author,
            Category,
            Tag,
            Article,
            ArticleSummary,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            product_handler::ProductRequest,
            product_handler::BulkArchiveRequest,
            product_handler::BulkArchiveResponse,
            order_handler::OrderRequest,
            order_handler::ImportForm,
            order_handler::ImportResponse,
            blog_handler::AuthorRequest,
            blog_handler::CategoryRequest,
            blog_handler::TagRequest,
            blog_handler::ArticleRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "Accounts and profiles"),
        (name = "Products", description = "Catalog, export and feed"),
        (name = "Orders", description = "Orders, CSV import and cached export"),
        (name = "Blog", description = "Articles, authors, categories and tags")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /myauth/login"))
                        .build(),
                ),
            );
        }
    }
}
