//! Account and profile handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ProfileChanges, ProfileResponse, UserResponse};
use crate::errors::AppResult;

/// Profile update request. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[schema(example = "Collector of rare keyboards")]
    pub bio: Option<String>,
    /// Avatar path or URL; an empty string removes the avatar
    #[validate(length(max = 255, message = "Avatar path is too long"))]
    #[schema(example = "avatars/7/me.png")]
    pub avatar: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            bio: req.bio,
            avatar: req
                .avatar
                .map(|avatar| Some(avatar).filter(|a| !a.is_empty())),
        }
    }
}

/// Create account routes (all require authentication)
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/about-me", get(about_me).patch(update_about_me))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_profile).patch(update_profile))
}

/// Profile of the current user
#[utoipa::path(
    get,
    path = "/myauth/about-me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user's profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn about_me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.user_service.get_profile(current_user.id).await?;
    Ok(Json(profile))
}

/// Update the current user's avatar or bio
#[utoipa::path(
    patch,
    path = "/myauth/about-me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn update_about_me(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state
        .user_service
        .update_profile(
            current_user.id,
            current_user.role,
            current_user.id,
            payload.into(),
        )
        .await?;

    Ok(Json(profile))
}

/// List all users
#[utoipa::path(
    get,
    path = "/myauth/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Profile details of any user
#[utoipa::path(
    get,
    path = "/myauth/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.user_service.get_profile(id).await?;
    Ok(Json(profile))
}

/// Update a user's profile (owner or staff)
#[utoipa::path(
    patch,
    path = "/myauth/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Only the owner or staff"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state
        .user_service
        .update_profile(current_user.id, current_user.role, id, payload.into())
        .await?;

    Ok(Json(profile))
}
