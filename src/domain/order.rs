use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::cart::CartLine;
use super::catalog::Product;
use super::customer::Customer;
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn code(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "P",
            PaymentStatus::Completed => "C",
            PaymentStatus::Failed => "F",
        }
    }

    /// Pending settles exactly once, to Completed or Failed.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" => Ok(PaymentStatus::Pending),
            "C" => Ok(PaymentStatus::Completed),
            "F" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::invalid_input(
                "payment_status",
                format!("unknown payment status '{other}'"),
            )),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub customer_id: i64,
    pub placed_at: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl NewOrderItem {
    /// Freezes the cart line's current product price into the order.
    pub fn snapshot(order_id: i64, line: &CartLine) -> Self {
        Self {
            order_id,
            product_id: line.item.product_id,
            quantity: line.item.quantity,
            unit_price: line.product.unit_price.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// An order item next to its product. `item.unit_price` is the price paid;
/// `product.unit_price` is whatever the catalog says today.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub item: OrderItem,
    pub product: Product,
}

impl OrderLine {
    pub fn total_price(&self) -> BigDecimal {
        (&self.item.unit_price * BigDecimal::from(self.item.quantity)).with_scale(2)
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
}

impl OrderView {
    pub fn total_order_price(&self) -> BigDecimal {
        self.lines
            .iter()
            .fold(BigDecimal::from(0), |acc, line| acc + line.total_price())
            .with_scale(2)
    }
}
