//! Catalog products.
//!
//! Products are never physically removed by the shop: archiving sets the
//! `archived` flag and hides the product from the public listing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::Ordering;

/// Product as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "pk")]
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "Laptop")]
    pub name: String,
    pub description: String,
    #[schema(example = 1999.0)]
    pub price: f64,
    /// Discount in percent
    #[schema(example = 10)]
    pub discount: i16,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
}

impl Product {
    /// Description shortened to `max_chars` characters; `None` when empty.
    pub fn description_preview(&self, max_chars: usize) -> Option<String> {
        if self.description.is_empty() {
            return None;
        }
        Some(self.description.chars().take(max_chars).collect())
    }
}

/// Editable product fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub discount: i16,
}

/// One entry of the product data export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductExportEntry {
    pub pk: i32,
    pub name: String,
    pub price: f64,
    pub archived: bool,
}

impl From<Product> for ProductExportEntry {
    fn from(product: Product) -> Self {
        Self {
            pk: product.id,
            name: product.name,
            price: product.price,
            archived: product.archived,
        }
    }
}

/// Product data export document: `{"products": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductExport {
    pub products: Vec<ProductExportEntry>,
}

/// Fields the product listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Pk,
    Name,
    Price,
    Discount,
}

impl FromStr for ProductSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pk" | "id" => Ok(ProductSort::Pk),
            "name" => Ok(ProductSort::Name),
            "price" => Ok(ProductSort::Price),
            "discount" => Ok(ProductSort::Discount),
            _ => Err(()),
        }
    }
}

/// Product listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    /// Substring matched against name or description
    pub search: Option<String>,
    pub ordering: Ordering<ProductSort>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            ordering: Ordering {
                field: ProductSort::Pk,
                descending: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(description: &str) -> Product {
        Product {
            id: 1,
            name: "Desk".into(),
            description: description.into(),
            price: 10.0,
            discount: 0,
            created_at: Utc::now(),
            archived: false,
        }
    }

    #[test]
    fn test_description_preview() {
        assert_eq!(product("").description_preview(150), None);
        assert_eq!(product("oak").description_preview(150).as_deref(), Some("oak"));
        assert_eq!(product(&"é".repeat(200)).description_preview(150).unwrap().chars().count(), 150);
    }

    #[test]
    fn test_serializes_pk() {
        let json = serde_json::to_value(product("oak")).unwrap();
        assert_eq!(json["pk"], 1);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_sort_fields() {
        assert_eq!("price".parse(), Ok(ProductSort::Price));
        assert!("created_at".parse::<ProductSort>().is_err());
    }
}
