use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::errors::{require_text, DomainError};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub inventory: i32,
    pub last_update: DateTime<Utc>,
    pub collection_id: i64,
}

impl Product {
    /// Unit price with the flat 10% sales tax applied, rounded to cents.
    pub fn price_with_tax(&self) -> BigDecimal {
        let rate = BigDecimal::new(11.into(), 1);
        (&self.unit_price * rate).round(2).with_scale(2)
    }
}

/// Fields a product is created with, or replaced by.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub inventory: i32,
    pub collection_id: i64,
}

impl ProductDraft {
    /// Prices are stored as NUMERIC(6,2): at least 1, below 10000, cents only.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("title", &self.title, 255)?;
        require_text("slug", &self.slug, 255)?;
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::invalid_input(
                "slug",
                "may only contain letters, numbers, hyphens and underscores",
            ));
        }

        if self.unit_price < BigDecimal::from(1) {
            return Err(DomainError::invalid_input("unit_price", "must be >= 1"));
        }
        if self.unit_price >= BigDecimal::from(10_000) {
            return Err(DomainError::invalid_input("unit_price", "must be below 10000"));
        }
        if self.unit_price.with_scale(2) != self.unit_price {
            return Err(DomainError::invalid_input(
                "unit_price",
                "may have at most 2 decimal places",
            ));
        }
        Ok(())
    }
}

/// A collection with the number of products filed under it.
#[derive(Debug, Clone)]
pub struct Collection {
    pub id: i64,
    pub title: String,
    pub featured_product_id: Option<i64>,
    pub products_count: i64,
}

#[derive(Debug, Clone)]
pub struct CollectionDraft {
    pub title: String,
    pub featured_product_id: Option<i64>,
}

impl CollectionDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("title", &self.title, 255)
    }
}
