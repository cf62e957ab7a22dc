//! Orders: a user, a delivery address and a set of products.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::product::Product;
use super::user::{User, UserResponse};
use crate::types::Ordering;

/// Order row without its relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub delivery_address: String,
    pub promocode: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i32,
}

/// Order with its user joined and products loaded.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub user: User,
    pub products: Vec<Product>,
}

/// Serialized order, as exported and returned by the order API.
///
/// `user` and `products` carry primary keys only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderRecord {
    #[schema(example = 12)]
    pub pk: i32,
    #[schema(example = "123 Main St")]
    pub delivery_address: String,
    #[schema(example = "PROMO5")]
    pub promocode: String,
    pub created_at: DateTime<Utc>,
    #[schema(example = 7)]
    pub user: i32,
    #[schema(example = json!([3, 9]))]
    pub products: Vec<i32>,
}

impl From<&OrderDetails> for OrderRecord {
    fn from(details: &OrderDetails) -> Self {
        Self {
            pk: details.order.id,
            delivery_address: details.order.delivery_address.clone(),
            promocode: details.order.promocode.clone(),
            created_at: details.order.created_at,
            user: details.user.id,
            products: details.products.iter().map(|p| p.id).collect(),
        }
    }
}

/// Order with user and products expanded, for the order detail page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderView {
    pub pk: i32,
    pub delivery_address: String,
    pub promocode: String,
    pub created_at: DateTime<Utc>,
    pub user: UserResponse,
    pub products: Vec<Product>,
}

impl From<OrderDetails> for OrderView {
    fn from(details: OrderDetails) -> Self {
        Self {
            pk: details.order.id,
            delivery_address: details.order.delivery_address,
            promocode: details.order.promocode,
            created_at: details.order.created_at,
            user: UserResponse::from(details.user),
            products: details.products,
        }
    }
}

/// Data for a new order. Unknown product ids are dropped when the order is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub delivery_address: String,
    pub promocode: String,
    pub user_id: i32,
    pub product_ids: Vec<i32>,
}

/// Fields the order listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSort {
    Pk,
    DeliveryAddress,
    CreatedAt,
}

impl FromStr for OrderSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pk" | "id" => Ok(OrderSort::Pk),
            "delivery_address" => Ok(OrderSort::DeliveryAddress),
            "created_at" => Ok(OrderSort::CreatedAt),
            _ => Err(()),
        }
    }
}

/// Exact-match filters for the order listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFilter {
    pub delivery_address: Option<String>,
    pub promocode: Option<String>,
    pub user_id: Option<i32>,
    pub ordering: Ordering<OrderSort>,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            delivery_address: None,
            promocode: None,
            user_id: None,
            ordering: Ordering {
                field: OrderSort::Pk,
                descending: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    #[test]
    fn test_record_flattens_relations() {
        let now = Utc::now();
        let details = OrderDetails {
            order: Order {
                id: 4,
                delivery_address: "123 Main St".into(),
                promocode: "PROMO5".into(),
                created_at: now,
                user_id: 7,
            },
            user: User {
                id: 7,
                username: "seven".into(),
                email: String::new(),
                password_hash: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                role: UserRole::User,
                created_at: now,
            },
            products: vec![3, 9]
                .into_iter()
                .map(|id| Product {
                    id,
                    name: format!("p{}", id),
                    description: String::new(),
                    price: 1.0,
                    discount: 0,
                    created_at: now,
                    archived: false,
                })
                .collect(),
        };

        let record = OrderRecord::from(&details);
        assert_eq!(record.pk, 4);
        assert_eq!(record.user, 7);
        assert_eq!(record.products, vec![3, 9]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["products"], serde_json::json!([3, 9]));
    }
}
