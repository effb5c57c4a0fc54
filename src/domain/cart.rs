use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::Product;
use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: Uuid,
    pub product_id: i64,
    pub quantity: i32,
}

/// A cart item joined with the product as it is priced right now.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    pub fn total_price(&self) -> BigDecimal {
        (&self.product.unit_price * BigDecimal::from(self.item.quantity)).with_scale(2)
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

impl CartView {
    pub fn total_price(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(BigDecimal::from(0), |acc, line| acc + line.total_price())
            .with_scale(2)
    }
}

pub fn validate_quantity(quantity: i32) -> Result<i32, DomainError> {
    if quantity < 1 {
        return Err(DomainError::invalid_input(
            "quantity",
            format!("must be at least 1, got {quantity}"),
        ));
    }
    Ok(quantity)
}

/// Quantity of an existing line after adding `added` more of the product.
pub fn merge_quantity(existing: i32, added: i32) -> Result<i32, DomainError> {
    existing.checked_add(added).ok_or_else(|| {
        DomainError::invalid_input(
            "quantity",
            format!("adding {added} to {existing} exceeds the maximum of {}", i32::MAX),
        )
    })
}
