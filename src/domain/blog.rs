//! Blog: authors, categories, tags and articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// Article row without relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub pub_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: i32,
    pub category_id: Option<i32>,
}

/// Listing entry: the article body is left out, its relations are expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArticleSummary {
    pub id: i32,
    pub title: String,
    pub pub_date: DateTime<Utc>,
    pub author: Author,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

/// Data for a new article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub category_id: Option<i32>,
    pub tag_ids: Vec<i32>,
}
