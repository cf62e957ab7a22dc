//! Product handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_staff, CurrentUser};
use crate::api::AppState;
use crate::domain::{Product, ProductDraft, ProductExport, ProductQuery};
use crate::errors::AppResult;
use crate::types::{Created, Ordering};

/// Product listing query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProductListParams {
    /// Substring of the name or description
    pub search: Option<String>,
    /// One of `pk`, `name`, `price`, `discount`; prefix with `-` for descending
    #[param(example = "-price")]
    pub ordering: Option<String>,
}

/// Product create/update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Laptop")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    #[schema(example = 1999.0)]
    pub price: f64,
    /// Discount in percent
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "Discount must be 0-100"))]
    #[schema(example = 10)]
    pub discount: i16,
}

impl From<ProductRequest> for ProductDraft {
    fn from(req: ProductRequest) -> Self {
        ProductDraft {
            name: req.name,
            description: req.description,
            price: req.price,
            discount: req.discount,
        }
    }
}

/// Bulk archive/unarchive request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkArchiveRequest {
    #[validate(length(min = 1, message = "At least one product id is required"))]
    #[schema(example = json!([1, 2]))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkArchiveResponse {
    /// Number of products whose flag was written
    pub changed: u64,
}

/// Routes readable without authentication
pub fn product_public_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/export", get(export_products))
        .route("/products/latest/feed", get(latest_feed))
        .route("/products/:id", get(get_product))
}

/// Routes that require authentication
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/archive", post(archive_products))
        .route("/products/unarchive", post(unarchive_products))
        .route("/products/:id", put(update_product))
        .route("/products/:id/archive", post(archive_product))
}

/// List products that are not archived
#[utoipa::path(
    get,
    path = "/shop/products",
    tag = "Products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Matching products", body = Vec<Product>),
        (status = 400, description = "Unknown ordering field")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<Vec<Product>>> {
    let query = ProductQuery {
        ordering: Ordering::parse_or(params.ordering.as_deref(), ProductQuery::default().ordering)?,
        search: params.search,
    };
    let products = state.product_service.list_products(query).await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/shop/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.product_service.get_product(id).await?))
}

#[utoipa::path(
    post,
    path = "/shop/products",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Created<Product>> {
    let product = state.product_service.create_product(payload.into()).await?;
    Ok(Created(product))
}

#[utoipa::path(
    put,
    path = "/shop/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Json<Product>> {
    let product = state
        .product_service
        .update_product(id, payload.into())
        .await?;
    Ok(Json(product))
}

/// Soft delete a product
#[utoipa::path(
    post,
    path = "/shop/products/{id}/archive",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product archived", body = Product),
        (status = 404, description = "Product not found")
    )
)]
pub async fn archive_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.product_service.archive_product(id).await?))
}

/// Archive several products (staff only)
#[utoipa::path(
    post,
    path = "/shop/products/archive",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = BulkArchiveRequest,
    responses(
        (status = 200, description = "Products archived", body = BulkArchiveResponse),
        (status = 403, description = "Forbidden - Staff only")
    )
)]
pub async fn archive_products(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkArchiveRequest>,
) -> AppResult<Json<BulkArchiveResponse>> {
    require_staff(&current_user)?;
    let changed = state.product_service.set_archived(payload.ids, true).await?;
    Ok(Json(BulkArchiveResponse { changed }))
}

/// Unarchive several products (staff only)
#[utoipa::path(
    post,
    path = "/shop/products/unarchive",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = BulkArchiveRequest,
    responses(
        (status = 200, description = "Products restored", body = BulkArchiveResponse),
        (status = 403, description = "Forbidden - Staff only")
    )
)]
pub async fn unarchive_products(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkArchiveRequest>,
) -> AppResult<Json<BulkArchiveResponse>> {
    require_staff(&current_user)?;
    let changed = state.product_service.set_archived(payload.ids, false).await?;
    Ok(Json(BulkArchiveResponse { changed }))
}

/// Product data export, archived products included
#[utoipa::path(
    get,
    path = "/shop/products/export",
    tag = "Products",
    responses((status = 200, description = "All products", body = ProductExport))
)]
pub async fn export_products(State(state): State<AppState>) -> AppResult<Json<ProductExport>> {
    Ok(Json(state.product_service.export_products().await?))
}

/// RSS feed of the newest products
#[utoipa::path(
    get,
    path = "/shop/products/latest/feed",
    tag = "Products",
    responses((status = 200, description = "RSS 2.0 document", content_type = "application/rss+xml"))
)]
pub async fn latest_feed(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let xml = state.product_service.latest_feed().await?;
    Ok(([(CONTENT_TYPE, "application/rss+xml; charset=utf-8")], xml))
}
