//! Blog repository: authors, categories, tags and articles.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::{ArticleSummary, Author, Category, Tag};
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Articles newest first, with author, category and tags loaded
    async fn list_articles(&self) -> AppResult<Vec<ArticleSummary>>;

    async fn create_author(&self, name: String, bio: String) -> AppResult<Author>;

    /// Create a category; duplicate names are a conflict
    async fn create_category(&self, name: String) -> AppResult<Category>;

    /// Create a tag; duplicate names are a conflict
    async fn create_tag(&self, name: String) -> AppResult<Tag>;
}

pub struct BlogStore {
    db: DatabaseConnection,
}

impl BlogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BlogRepository for BlogStore {
    async fn list_articles(&self) -> AppResult<Vec<ArticleSummary>> {
        queries::list_articles(&self.db).await
    }

    async fn create_author(&self, name: String, bio: String) -> AppResult<Author> {
        queries::create_author(&self.db, name, bio).await
    }

    async fn create_category(&self, name: String) -> AppResult<Category> {
        queries::create_category(&self.db, name).await
    }

    async fn create_tag(&self, name: String) -> AppResult<Tag> {
        queries::create_tag(&self.db, name).await
    }
}

pub(crate) mod queries {
    use std::collections::HashMap;

    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait, QueryFilter,
        QueryOrder, QuerySelect, Set,
    };

    use super::super::conflict_or_db;
    use super::super::entities::{article, article_tag, author, category, tag};
    use crate::domain::{Article, ArticleSummary, Author, Category, NewArticle, Tag};
    use crate::errors::{AppError, AppResult};

    pub async fn list_articles<C: ConnectionTrait>(db: &C) -> AppResult<Vec<ArticleSummary>> {
        let rows = article::Entity::find()
            .find_also_related(author::Entity)
            .order_by_desc(article::Column::PubDate)
            .order_by_desc(article::Column::Id)
            .all(db)
            .await
            .map_err(AppError::from)?;

        let articles: Vec<article::Model> = rows.iter().map(|(a, _)| a.clone()).collect();
        let tags = articles
            .load_many_to_many(tag::Entity, article_tag::Entity, db)
            .await
            .map_err(AppError::from)?;

        let category_ids: Vec<i32> = articles.iter().filter_map(|a| a.category_id).collect();
        let categories: HashMap<i32, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(db)
                .await
                .map_err(AppError::from)?
                .into_iter()
                .map(|c| (c.id, Category::from(c)))
                .collect()
        };

        rows.into_iter()
            .zip(tags)
            .map(|((article, writer), tags)| {
                let writer = writer.ok_or_else(|| {
                    AppError::internal(format!("Article {} has no author", article.id))
                })?;
                let mut tags: Vec<Tag> = tags.into_iter().map(Tag::from).collect();
                tags.sort_by_key(|t| t.id);

                Ok(ArticleSummary {
                    id: article.id,
                    title: article.title,
                    pub_date: article.pub_date,
                    author: Author::from(writer),
                    category: article
                        .category_id
                        .and_then(|id| categories.get(&id).cloned()),
                    tags,
                })
            })
            .collect()
    }

    pub async fn create_author<C: ConnectionTrait>(
        db: &C,
        name: String,
        bio: String,
    ) -> AppResult<Author> {
        let model = author::ActiveModel {
            name: Set(name),
            bio: Set(bio),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(AppError::from)?;

        Ok(Author::from(model))
    }

    pub async fn create_category<C: ConnectionTrait>(db: &C, name: String) -> AppResult<Category> {
        let model = category::ActiveModel {
            name: Set(name),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| conflict_or_db(e, "Category"))?;

        Ok(Category::from(model))
    }

    pub async fn create_tag<C: ConnectionTrait>(db: &C, name: String) -> AppResult<Tag> {
        let model = tag::ActiveModel {
            name: Set(name),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| conflict_or_db(e, "Tag"))?;

        Ok(Tag::from(model))
    }

    /// Insert an article and its tag links.
    ///
    /// The author and category must exist; tag IDs that do not exist are left out.
    pub async fn create_article<C: ConnectionTrait>(
        db: &C,
        new_article: NewArticle,
    ) -> AppResult<Article> {
        author::Entity::find_by_id(new_article.author_id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(category_id) = new_article.category_id {
            category::Entity::find_by_id(category_id)
                .one(db)
                .await?
                .ok_or(AppError::NotFound)?;
        }

        let tag_ids: Vec<i32> = if new_article.tag_ids.is_empty() {
            Vec::new()
        } else {
            tag::Entity::find()
                .select_only()
                .column(tag::Column::Id)
                .filter(tag::Column::Id.is_in(new_article.tag_ids))
                .into_tuple()
                .all(db)
                .await
                .map_err(AppError::from)?
        };

        let now = chrono::Utc::now();
        let model = article::ActiveModel {
            title: Set(new_article.title),
            content: Set(new_article.content),
            pub_date: Set(now),
            updated_at: Set(now),
            author_id: Set(new_article.author_id),
            category_id: Set(new_article.category_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(AppError::from)?;

        if !tag_ids.is_empty() {
            let links = tag_ids.into_iter().map(|tag_id| article_tag::ActiveModel {
                article_id: Set(model.id),
                tag_id: Set(tag_id),
            });
            article_tag::Entity::insert_many(links)
                .exec_without_returning(db)
                .await
                .map_err(AppError::from)?;
        }

        Ok(Article::from(model))
    }
}
