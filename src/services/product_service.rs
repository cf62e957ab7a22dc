//! Product service - Catalog management, data export and the latest-products feed.

use async_trait::async_trait;
use std::sync::Arc;

use super::feed::{render_rss, Channel, FeedItem};
use crate::config::{
    FEED_DESCRIPTION, FEED_DESCRIPTION_MAX_CHARS, FEED_ITEMS_LIMIT, FEED_TITLE,
    PRODUCTS_LIST_PATH,
};
use crate::domain::{Product, ProductDraft, ProductExport, ProductExportEntry, ProductQuery};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait ProductService: Send + Sync {
    /// Non-archived products matching the query
    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>>;

    async fn get_product(&self, id: i32) -> AppResult<Product>;

    async fn create_product(&self, draft: ProductDraft) -> AppResult<Product>;

    async fn update_product(&self, id: i32, draft: ProductDraft) -> AppResult<Product>;

    /// Soft delete: the product is archived, never removed
    async fn archive_product(&self, id: i32) -> AppResult<Product>;

    /// Bulk archive or unarchive; returns the number of products changed
    async fn set_archived(&self, ids: Vec<i32>, archived: bool) -> AppResult<u64>;

    /// Every product, archived included, ordered by ID
    async fn export_products(&self) -> AppResult<ProductExport>;

    /// RSS document of the newest products
    async fn latest_feed(&self) -> AppResult<String>;
}

pub struct ProductManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProductManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn feed_item(product: Product) -> FeedItem {
    let description = product
        .description_preview(FEED_DESCRIPTION_MAX_CHARS)
        .unwrap_or_else(|| "None".to_string());

    FeedItem {
        link: format!("{}/{}", PRODUCTS_LIST_PATH, product.id),
        description,
        pub_date: Some(product.created_at),
        title: product.name,
    }
}

#[async_trait]
impl<U: UnitOfWork> ProductService for ProductManager<U> {
    async fn list_products(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        self.uow.products().list(query).await
    }

    async fn get_product(&self, id: i32) -> AppResult<Product> {
        self.uow.products().find_by_id(id).await?.ok_or_not_found()
    }

    async fn create_product(&self, draft: ProductDraft) -> AppResult<Product> {
        let product = self.uow.products().create(draft).await?;
        tracing::info!(product_id = product.id, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: i32, draft: ProductDraft) -> AppResult<Product> {
        self.uow.products().update(id, draft).await
    }

    async fn archive_product(&self, id: i32) -> AppResult<Product> {
        let changed = self.uow.products().set_archived(vec![id], true).await?;
        if changed == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(product_id = id, "Product archived");
        self.get_product(id).await
    }

    async fn set_archived(&self, ids: Vec<i32>, archived: bool) -> AppResult<u64> {
        let changed = self.uow.products().set_archived(ids, archived).await?;
        tracing::info!(changed, archived, "Products archive flag updated");
        Ok(changed)
    }

    async fn export_products(&self) -> AppResult<ProductExport> {
        let products = self.uow.products().list_all().await?;
        Ok(ProductExport {
            products: products.into_iter().map(ProductExportEntry::from).collect(),
        })
    }

    async fn latest_feed(&self) -> AppResult<String> {
        let products = self.uow.products().latest(FEED_ITEMS_LIMIT).await?;
        let channel = Channel {
            title: FEED_TITLE.to_string(),
            link: PRODUCTS_LIST_PATH.to_string(),
            description: FEED_DESCRIPTION.to_string(),
        };
        let items: Vec<FeedItem> = products.into_iter().map(feed_item).collect();

        Ok(render_rss(&channel, &items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MockProductRepository;
    use crate::services::testing::TestUnitOfWork;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn product(id: i32, description: &str, archived: bool) -> Product {
        Product {
            id,
            name: format!("Product {}", id),
            description: description.into(),
            price: 10.5,
            discount: 0,
            created_at: Utc::now(),
            archived,
        }
    }

    fn service(products: MockProductRepository) -> ProductManager<TestUnitOfWork> {
        ProductManager::new(Arc::new(TestUnitOfWork {
            products: Arc::new(products),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn test_archive_sets_flag_and_returns_product() {
        let mut products = MockProductRepository::new();
        products
            .expect_set_archived()
            .with(eq(vec![4]), eq(true))
            .times(1)
            .returning(|_, _| Ok(1));
        products
            .expect_find_by_id()
            .returning(|id| Ok(Some(product(id, "", true))));

        let archived = service(products).archive_product(4).await.unwrap();
        assert!(archived.archived);
    }

    #[tokio::test]
    async fn test_archive_unknown_product() {
        let mut products = MockProductRepository::new();
        products.expect_set_archived().returning(|_, _| Ok(0));

        let result = service(products).archive_product(4).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_export_keeps_archived_products() {
        let mut products = MockProductRepository::new();
        products
            .expect_list_all()
            .returning(|| Ok(vec![product(1, "a", false), product(2, "b", true)]));

        let export = service(products).export_products().await.unwrap();
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["products"][1]["pk"], 2);
        assert_eq!(json["products"][1]["archived"], true);
        assert!(json["products"][0].get("description").is_none());
    }

    #[tokio::test]
    async fn test_feed_truncates_descriptions() {
        let mut products = MockProductRepository::new();
        products
            .expect_latest()
            .with(eq(FEED_ITEMS_LIMIT))
            .returning(|_| Ok(vec![product(2, &"x".repeat(400), false), product(1, "", false)]));

        let xml = service(products).latest_feed().await.unwrap();
        assert!(xml.contains(&format!("<description>{}</description>", "x".repeat(150))));
        assert!(xml.contains("<description>None</description>"));
        assert!(xml.contains("<link>/shop/products/2</link>"));
    }
}
