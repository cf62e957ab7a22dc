//! Order handlers, including the CSV import and the cached per-user export.

use axum::{
    extract::{
        multipart::MultipartError, DefaultBodyLimit, Extension, Multipart, Path, Query, State,
    },
    http::{
        header::{CONTENT_TYPE, LOCATION},
        StatusCode,
    },
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_staff, CurrentUser};
use crate::api::AppState;
use crate::config::{DEFAULT_CSV_ENCODING, ORDERS_LIST_PATH, ORDER_IMPORT_SUCCESS_MESSAGE};
use crate::domain::{NewOrder, OrderFilter, OrderRecord, OrderView};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Ordering};

/// Order listing query parameters. Filters are exact matches.
#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListParams {
    pub delivery_address: Option<String>,
    pub promocode: Option<String>,
    /// Owner's user id
    pub user: Option<i32>,
    /// One of `pk`, `delivery_address`, `created_at`; prefix with `-` for descending
    #[param(example = "-created_at")]
    pub ordering: Option<String>,
}

/// Order create/update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OrderRequest {
    #[serde(default)]
    #[schema(example = "123 Main St")]
    pub delivery_address: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "Promocode must be at most 20 characters"))]
    #[schema(example = "PROMO5")]
    pub promocode: String,
    #[schema(example = 7)]
    pub user: i32,
    /// Product ids; unknown ids are ignored
    #[serde(default)]
    #[schema(example = json!([3, 9]))]
    pub products: Vec<i32>,
}

impl From<OrderRequest> for NewOrder {
    fn from(req: OrderRequest) -> Self {
        NewOrder {
            delivery_address: req.delivery_address,
            promocode: req.promocode,
            user_id: req.user,
            product_ids: req.products,
        }
    }
}

/// Body sent along with the import redirect
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    #[schema(example = "Orders imported from CSV-file successfully")]
    pub message: String,
    #[schema(example = 5)]
    pub created: usize,
}

/// Multipart form of the import upload (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ImportForm {
    #[schema(value_type = String, format = Binary)]
    csv_file: Vec<u8>,
    #[schema(example = "utf-8")]
    encoding: Option<String>,
}

/// Create order routes (all require authentication)
///
/// Uploads to the import route may be up to `import_max_bytes` long; every
/// other route keeps axum's default body limit.
pub fn order_routes(import_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/import",
            post(import_orders).layer(DefaultBodyLimit::max(import_max_bytes)),
        )
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/users/:id/orders", get(list_user_orders))
        .route("/users/:id/orders/export", get(export_user_orders))
}

#[utoipa::path(
    get,
    path = "/shop/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(OrderListParams),
    responses(
        (status = 200, description = "Matching orders", body = Vec<OrderView>),
        (status = 400, description = "Unknown ordering field"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<Vec<OrderView>>> {
    let filter = OrderFilter {
        ordering: Ordering::parse_or(params.ordering.as_deref(), OrderFilter::default().ordering)?,
        delivery_address: params.delivery_address,
        promocode: params.promocode,
        user_id: params.user,
    };
    Ok(Json(state.order_service.list_orders(filter).await?))
}

#[utoipa::path(
    post,
    path = "/shop/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderView),
        (status = 400, description = "Validation error or unknown user"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<OrderRequest>,
) -> AppResult<Created<OrderView>> {
    let order = state.order_service.create_order(payload.into()).await?;
    Ok(Created(order))
}

#[utoipa::path(
    get,
    path = "/shop/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = OrderView),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.order_service.get_order(id).await?))
}

#[utoipa::path(
    put,
    path = "/shop/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderView),
        (status = 400, description = "Validation error or unknown user"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<OrderRequest>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.order_service.update_order(id, payload.into()).await?))
}

#[utoipa::path(
    delete,
    path = "/shop/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    state.order_service.delete_order(id).await?;
    Ok(NoContent)
}

/// Import orders from an uploaded CSV file (staff only)
///
/// Either every row becomes an order or none does.
#[utoipa::path(
    post,
    path = "/shop/orders/import",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body(content = ImportForm, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Orders imported", body = ImportResponse),
        (status = 400, description = "Missing file, undecodable file or bad row"),
        (status = 403, description = "Forbidden - Staff only"),
        (status = 413, description = "File larger than the configured import limit")
    )
)]
pub async fn import_orders(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    require_staff(&current_user)?;

    let upload_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(state.import_max_bytes)
        } else {
            AppError::BadRequest(e.body_text())
        }
    };

    let mut data = None;
    let mut encoding = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        match field.name() {
            Some("csv_file") => {
                let bytes = field.bytes().await.map_err(upload_error)?;
                data = Some(bytes.to_vec());
            }
            Some("encoding") => {
                let label = field.text().await.map_err(upload_error)?;
                encoding = Some(label).filter(|l| !l.trim().is_empty());
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::BadRequest("csv_file is required".into()))?;
    let encoding = encoding.unwrap_or_else(|| DEFAULT_CSV_ENCODING.to_string());

    tracing::info!(
        user_id = %current_user.id,
        bytes = data.len(),
        encoding = %encoding,
        "Importing orders"
    );
    let report = state.order_service.import_orders(data, encoding).await?;

    Ok((
        StatusCode::SEE_OTHER,
        [(LOCATION, ORDERS_LIST_PATH)],
        Json(ImportResponse {
            message: ORDER_IMPORT_SUCCESS_MESSAGE.to_string(),
            created: report.created,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/shop/users/{id}/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's orders, newest first", body = Vec<OrderView>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<OrderView>>> {
    Ok(Json(state.order_service.list_user_orders(user_id).await?))
}

/// Cached export of a user's orders
///
/// The body is served exactly as cached.
#[utoipa::path(
    get,
    path = "/shop/users/{id}/orders/export",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user's orders, newest first", body = Vec<OrderRecord>),
        (status = 404, description = "User not found")
    )
)]
pub async fn export_user_orders(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let payload = state.order_service.export_user_orders(user_id).await?;
    Ok(([(CONTENT_TYPE, "application/json")], payload))
}
