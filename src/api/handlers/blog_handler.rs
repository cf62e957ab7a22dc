//! Blog handlers.

use axum::{extract::State, response::Json, routing::{get, post}, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Article, ArticleSummary, Author, Category, NewArticle, Tag};
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AuthorRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Jane Writer")]
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

/// Category or tag name
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 40, message = "Name must be 1-40 characters"))]
    #[schema(example = "Hardware")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TagRequest {
    #[validate(length(min = 1, max = 20, message = "Name must be 1-20 characters"))]
    #[schema(example = "rust")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ArticleRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "Mechanical keyboards, revisited")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[schema(example = 1)]
    pub author: i32,
    pub category: Option<i32>,
    /// Tag ids; unknown ids are ignored
    #[serde(default)]
    pub tags: Vec<i32>,
}

impl From<ArticleRequest> for NewArticle {
    fn from(req: ArticleRequest) -> Self {
        NewArticle {
            title: req.title,
            content: req.content,
            author_id: req.author,
            category_id: req.category,
            tag_ids: req.tags,
        }
    }
}

/// Create blog routes (all require authentication)
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route("/authors", post(create_author))
        .route("/categories", post(create_category))
        .route("/tags", post(create_tag))
}

/// Articles newest first; content is omitted
#[utoipa::path(
    get,
    path = "/blog/articles",
    tag = "Blog",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Article listing", body = Vec<ArticleSummary>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_articles(State(state): State<AppState>) -> AppResult<Json<Vec<ArticleSummary>>> {
    Ok(Json(state.blog_service.list_articles().await?))
}

#[utoipa::path(
    post,
    path = "/blog/articles",
    tag = "Blog",
    security(("bearer_auth" = [])),
    request_body = ArticleRequest,
    responses(
        (status = 201, description = "Article published", body = Article),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Author or category not found")
    )
)]
pub async fn create_article(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ArticleRequest>,
) -> AppResult<Created<Article>> {
    let article = state.blog_service.create_article(payload.into()).await?;
    Ok(Created(article))
}

#[utoipa::path(
    post,
    path = "/blog/authors",
    tag = "Blog",
    security(("bearer_auth" = [])),
    request_body = AuthorRequest,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AuthorRequest>,
) -> AppResult<Created<Author>> {
    let author = state
        .blog_service
        .create_author(payload.name, payload.bio)
        .await?;
    Ok(Created(author))
}

#[utoipa::path(
    post,
    path = "/blog/categories",
    tag = "Blog",
    security(("bearer_auth" = [])),
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Category already exists")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> AppResult<Created<Category>> {
    Ok(Created(state.blog_service.create_category(payload.name).await?))
}

#[utoipa::path(
    post,
    path = "/blog/tags",
    tag = "Blog",
    security(("bearer_auth" = [])),
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Tag already exists")
    )
)]
pub async fn create_tag(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TagRequest>,
) -> AppResult<Created<Tag>> {
    Ok(Created(state.blog_service.create_tag(payload.name).await?))
}
