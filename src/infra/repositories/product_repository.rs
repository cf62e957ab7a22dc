//! Product repository.
//!
//! The public listing only sees products that are not archived; the export,
//! the feed and direct lookups see all of them.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::{Product, ProductDraft, ProductQuery};
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List non-archived products matching the query
    async fn list(&self, query: ProductQuery) -> AppResult<Vec<Product>>;

    /// List every product, archived included, ordered by ID
    async fn list_all(&self) -> AppResult<Vec<Product>>;

    /// Newest products first, archived included
    async fn latest(&self, limit: u64) -> AppResult<Vec<Product>>;

    /// Find product by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>>;

    /// Create a new product
    async fn create(&self, draft: ProductDraft) -> AppResult<Product>;

    /// Replace the editable fields of a product
    async fn update(&self, id: i32, draft: ProductDraft) -> AppResult<Product>;

    /// Set the archived flag on the given products, returning how many changed
    async fn set_archived(&self, ids: Vec<i32>, archived: bool) -> AppResult<u64>;
}

pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(&self, query: ProductQuery) -> AppResult<Vec<Product>> {
        queries::list(&self.db, &query).await
    }

    async fn list_all(&self) -> AppResult<Vec<Product>> {
        queries::list_all(&self.db).await
    }

    async fn latest(&self, limit: u64) -> AppResult<Vec<Product>> {
        queries::latest(&self.db, limit).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Product>> {
        queries::find_by_id(&self.db, id).await
    }

    async fn create(&self, draft: ProductDraft) -> AppResult<Product> {
        queries::create(&self.db, draft).await
    }

    async fn update(&self, id: i32, draft: ProductDraft) -> AppResult<Product> {
        queries::update(&self.db, id, draft).await
    }

    async fn set_archived(&self, ids: Vec<i32>, archived: bool) -> AppResult<u64> {
        queries::set_archived(&self.db, &ids, archived).await
    }
}

pub(crate) mod queries {
    use sea_orm::sea_query::Expr;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, Order as SortOrder,
        QueryFilter, QueryOrder, QuerySelect, Set,
    };

    use super::super::entities::product::{self, ActiveModel, Entity as ProductEntity};
    use crate::domain::{Product, ProductDraft, ProductQuery, ProductSort};
    use crate::errors::{AppError, AppResult};

    fn sort_column(field: ProductSort) -> product::Column {
        match field {
            ProductSort::Pk => product::Column::Id,
            ProductSort::Name => product::Column::Name,
            ProductSort::Price => product::Column::Price,
            ProductSort::Discount => product::Column::Discount,
        }
    }

    pub async fn list<C: ConnectionTrait>(db: &C, query: &ProductQuery) -> AppResult<Vec<Product>> {
        let mut select = ProductEntity::find().filter(product::Column::Archived.eq(false));

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(product::Column::Name.contains(search))
                    .add(product::Column::Description.contains(search)),
            );
        }

        let direction = if query.ordering.descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        let models = select
            .order_by(sort_column(query.ordering.field), direction)
            .order_by_asc(product::Column::Id)
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    pub async fn list_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    pub async fn latest<C: ConnectionTrait>(db: &C, limit: u64) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(limit)
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Product::from))
    }

    /// IDs from `ids` that exist, in ascending order. Unknown IDs are left out.
    pub async fn existing_ids<C: ConnectionTrait>(db: &C, ids: &[i32]) -> AppResult<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i32> = ProductEntity::find()
            .select_only()
            .column(product::Column::Id)
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(product::Column::Id)
            .into_tuple()
            .all(db)
            .await
            .map_err(AppError::from)?;

        Ok(found)
    }

    pub async fn create<C: ConnectionTrait>(db: &C, draft: ProductDraft) -> AppResult<Product> {
        let active_model = ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            price: Set(draft.price),
            discount: Set(draft.discount),
            created_at: Set(chrono::Utc::now()),
            archived: Set(false),
            ..Default::default()
        };

        let model = active_model.insert(db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i32,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        let product = ProductEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = product.into();
        active.name = Set(draft.name);
        active.description = Set(draft.description);
        active.price = Set(draft.price);
        active.discount = Set(draft.discount);

        let model = active.update(db).await.map_err(AppError::from)?;
        Ok(Product::from(model))
    }

    pub async fn set_archived<C: ConnectionTrait>(
        db: &C,
        ids: &[i32],
        archived: bool,
    ) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = ProductEntity::update_many()
            .col_expr(product::Column::Archived, Expr::value(archived))
            .filter(product::Column::Id.is_in(ids.iter().copied()))
            .exec(db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
