//! Blog service.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Article, ArticleSummary, Author, Category, NewArticle, Tag};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait BlogService: Send + Sync {
    /// Articles newest first, without their content
    async fn list_articles(&self) -> AppResult<Vec<ArticleSummary>>;

    async fn create_author(&self, name: String, bio: String) -> AppResult<Author>;

    async fn create_category(&self, name: String) -> AppResult<Category>;

    async fn create_tag(&self, name: String) -> AppResult<Tag>;

    async fn create_article(&self, new_article: NewArticle) -> AppResult<Article>;
}

pub struct BlogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BlogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> BlogService for BlogManager<U> {
    async fn list_articles(&self) -> AppResult<Vec<ArticleSummary>> {
        self.uow.blog().list_articles().await
    }

    async fn create_author(&self, name: String, bio: String) -> AppResult<Author> {
        self.uow.blog().create_author(name, bio).await
    }

    async fn create_category(&self, name: String) -> AppResult<Category> {
        self.uow.blog().create_category(name).await
    }

    async fn create_tag(&self, name: String) -> AppResult<Tag> {
        self.uow.blog().create_tag(name).await
    }

    async fn create_article(&self, new_article: NewArticle) -> AppResult<Article> {
        let article = with_transaction!(self.uow, |ctx| {
            ctx.blog().create_article(new_article).await
        })?;
        tracing::info!(article_id = article.id, author_id = article.author_id, "Article published");
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::infra::MockBlogRepository;
    use crate::services::testing::TestUnitOfWork;
    use mockall::predicate::eq;

    fn service(blog: MockBlogRepository) -> BlogManager<TestUnitOfWork> {
        BlogManager::new(Arc::new(TestUnitOfWork {
            blog: Arc::new(blog),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_create_tag_passes_name_through() {
        let mut blog = MockBlogRepository::new();
        blog.expect_create_tag()
            .with(eq("rust".to_string()))
            .times(1)
            .returning(|name| Ok(Tag { id: 1, name }));

        let tag = service(blog).create_tag("rust".into()).await.unwrap();
        assert_eq!(tag.name, "rust");
    }

    #[tokio::test]
    async fn test_duplicate_category_is_a_conflict() {
        let mut blog = MockBlogRepository::new();
        blog.expect_create_category()
            .returning(|_| Err(AppError::conflict("Category")));

        let err = service(blog).create_category("News".into()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
