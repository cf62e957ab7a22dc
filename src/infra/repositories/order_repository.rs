//! Order repository.
//!
//! Orders are always read with their user joined and their products
//! batch-loaded through the link table, two statements per listing.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::{OrderDetails, OrderFilter};
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// List orders matching the filter
    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<OrderDetails>>;

    /// Find order by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<OrderDetails>>;

    /// A user's orders, newest first
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<OrderDetails>>;
}

pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<OrderDetails>> {
        queries::list(&self.db, &filter).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<OrderDetails>> {
        queries::find_by_id(&self.db, id).await
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<OrderDetails>> {
        queries::list_for_user(&self.db, user_id).await
    }
}

pub(crate) mod queries {
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, LoaderTrait,
        Order as SortOrder, QueryFilter, QueryOrder, Select, Set,
    };

    use super::super::entities::{
        order::{self, ActiveModel, Entity as OrderEntity},
        order_product, product, user,
    };
    use crate::domain::{Order, OrderDetails, OrderFilter, OrderSort, Product, User};
    use crate::errors::{AppError, AppResult};

    fn sort_column(field: OrderSort) -> order::Column {
        match field {
            OrderSort::Pk => order::Column::Id,
            OrderSort::DeliveryAddress => order::Column::DeliveryAddress,
            OrderSort::CreatedAt => order::Column::CreatedAt,
        }
    }

    /// Run `select` with the user joined and products loaded in one extra query.
    async fn load_details<C: ConnectionTrait>(
        db: &C,
        select: Select<OrderEntity>,
    ) -> AppResult<Vec<OrderDetails>> {
        let rows = select
            .find_also_related(user::Entity)
            .all(db)
            .await
            .map_err(AppError::from)?;

        let orders: Vec<order::Model> = rows.iter().map(|(order, _)| order.clone()).collect();
        let products = orders
            .load_many_to_many(product::Entity, order_product::Entity, db)
            .await
            .map_err(AppError::from)?;

        rows.into_iter()
            .zip(products)
            .map(|((order, owner), products)| {
                let owner = owner
                    .ok_or_else(|| AppError::internal(format!("Order {} has no user", order.id)))?;
                let mut products: Vec<Product> = products.into_iter().map(Product::from).collect();
                products.sort_by_key(|p| p.id);

                Ok(OrderDetails {
                    order: Order::from(order),
                    user: User::from(owner),
                    products,
                })
            })
            .collect()
    }

    pub async fn list<C: ConnectionTrait>(
        db: &C,
        filter: &OrderFilter,
    ) -> AppResult<Vec<OrderDetails>> {
        let mut select = OrderEntity::find();

        if let Some(address) = &filter.delivery_address {
            select = select.filter(order::Column::DeliveryAddress.eq(address.as_str()));
        }
        if let Some(promocode) = &filter.promocode {
            select = select.filter(order::Column::Promocode.eq(promocode.as_str()));
        }
        if let Some(user_id) = filter.user_id {
            select = select.filter(order::Column::UserId.eq(user_id));
        }

        let direction = if filter.ordering.descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        let select = select
            .order_by(sort_column(filter.ordering.field), direction)
            .order_by_asc(order::Column::Id);

        load_details(db, select).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: i32,
    ) -> AppResult<Option<OrderDetails>> {
        let select = OrderEntity::find().filter(order::Column::Id.eq(id));
        Ok(load_details(db, select).await?.into_iter().next())
    }

    pub async fn list_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: i32,
    ) -> AppResult<Vec<OrderDetails>> {
        let select = OrderEntity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id);

        load_details(db, select).await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        delivery_address: String,
        promocode: String,
        user_id: i32,
    ) -> AppResult<Order> {
        let active_model = ActiveModel {
            delivery_address: Set(delivery_address),
            promocode: Set(promocode),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(db).await.map_err(AppError::from)?;
        Ok(Order::from(model))
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i32,
        delivery_address: String,
        promocode: String,
        user_id: i32,
    ) -> AppResult<Order> {
        let order = OrderEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = order.into();
        active.delivery_address = Set(delivery_address);
        active.promocode = Set(promocode);
        active.user_id = Set(user_id);

        let model = active.update(db).await.map_err(AppError::from)?;
        Ok(Order::from(model))
    }

    /// Link products to an order. `product_ids` must exist and be distinct.
    pub async fn add_products<C: ConnectionTrait>(
        db: &C,
        order_id: i32,
        product_ids: &[i32],
    ) -> AppResult<()> {
        if product_ids.is_empty() {
            return Ok(());
        }

        let links = product_ids.iter().map(|&product_id| order_product::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(product_id),
        });

        order_product::Entity::insert_many(links)
            .exec_without_returning(db)
            .await
            .map_err(AppError::from)?;

        Ok(())
    }

    /// Replace all product links of an order.
    pub async fn replace_products<C: ConnectionTrait>(
        db: &C,
        order_id: i32,
        product_ids: &[i32],
    ) -> AppResult<()> {
        order_product::Entity::delete_many()
            .filter(order_product::Column::OrderId.eq(order_id))
            .exec(db)
            .await
            .map_err(AppError::from)?;

        add_products(db, order_id, product_ids).await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()> {
        order_product::Entity::delete_many()
            .filter(order_product::Column::OrderId.eq(id))
            .exec(db)
            .await
            .map_err(AppError::from)?;

        let result = OrderEntity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
