//! In-memory product filtering and sorting.
//!
//! The backend hands the UI a full product list; narrowing by category,
//! matching a typed query, and reordering all happen client-side over
//! that list. Relevance ranking is out of scope - a product either
//! matches the query or it does not.

use chrono::{DateTime, Utc};
use lavka_core::{CategoryId, Price, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product as fetched from the backend collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category: Option<CategoryId>,
    pub brand: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Inactive products are hidden from every listing.
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Case-insensitive substring match over title, description, brand,
    /// and category.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self
                .brand
                .as_deref()
                .is_some_and(|brand| brand.to_lowercase().contains(&query))
            || self
                .category
                .as_ref()
                .is_some_and(|category| category.as_str().to_lowercase().contains(&query))
    }
}

/// Sort key for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first by default.
    #[default]
    CreatedAt,
    Price,
    Title,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A listing filter: category, free-text query, and ordering.
///
/// The default filter shows every active product, newest first.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub query: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl ProductFilter {
    /// Apply the filter to a product list.
    ///
    /// Inactive products are always dropped. The input order is not
    /// preserved; the result is sorted by the configured key.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|product| product.active)
            .filter(|product| {
                self.category
                    .as_ref()
                    .is_none_or(|category| product.category.as_ref() == Some(category))
            })
            .filter(|product| {
                self.query
                    .as_deref()
                    .is_none_or(|query| product.matches_query(query))
            })
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            let ordering = match self.sort {
                SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                SortKey::Price => a.price.amount().cmp(&b.price.amount()),
                SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            };
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        result
    }
}

/// Distinct categories across a product list, sorted, for filter UIs.
#[must_use]
pub fn categories_of(products: &[Product]) -> Vec<CategoryId> {
    let mut categories: Vec<CategoryId> = products
        .iter()
        .filter(|product| product.active)
        .filter_map(|product| product.category.clone())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lavka_core::CurrencyCode;
    use rust_decimal::Decimal;

    fn product(id: &str, title: &str, category: &str, amount: i64, day: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            description: String::new(),
            price: Price::new(Decimal::from(amount), CurrencyCode::RUB).unwrap(),
            category: Some(CategoryId::new(category)),
            brand: None,
            images: Vec::new(),
            active: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("p1", "Wool socks", "clothes", 300, 1),
            product("p2", "Ceramic mug", "kitchen", 500, 2),
            product("p3", "Linen shirt", "clothes", 2000, 3),
        ]
    }

    #[test]
    fn test_default_filter_sorts_newest_first() {
        let result = ProductFilter::default().apply(&sample());
        let ids: Vec<_> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p3", "p2", "p1"]);
    }

    #[test]
    fn test_category_filter() {
        let filter = ProductFilter {
            category: Some(CategoryId::new("clothes")),
            ..Default::default()
        };
        let result = filter.apply(&sample());
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|p| p.category
            == Some(CategoryId::new("clothes"))));
    }

    #[test]
    fn test_inactive_products_hidden() {
        let mut products = sample();
        products[0].active = false;
        let result = ProductFilter::default().apply(&products);
        assert!(result.iter().all(|p| p.id.as_str() != "p1"));
    }

    #[test]
    fn test_price_ascending() {
        let filter = ProductFilter {
            sort: SortKey::Price,
            order: SortOrder::Asc,
            ..Default::default()
        };
        let result = filter.apply(&sample());
        let ids: Vec<_> = result.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
    }

    #[test]
    fn test_query_matches_title_case_insensitive() {
        let filter = ProductFilter {
            query: Some("WOOL".to_owned()),
            ..Default::default()
        };
        let result = filter.apply(&sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id.as_str(), "p1");
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let filter = ProductFilter {
            query: Some("   ".to_owned()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&sample()).len(), 3);
    }

    #[test]
    fn test_categories_of_distinct_sorted() {
        let categories = categories_of(&sample());
        let names: Vec<_> = categories.iter().map(CategoryId::as_str).collect();
        assert_eq!(names, ["clothes", "kitchen"]);
    }
}
