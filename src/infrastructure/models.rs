use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::catalog::{Collection, CollectionDraft, Product, ProductDraft};
use crate::domain::customer::{Customer, ProfileUpdate};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderItem, Order, OrderItem};
use crate::domain::review::{Review, ReviewDraft};
use crate::schema::{
    cart_items, carts, collections, customers, order_items, orders, products, reviews,
    store_order_outbox,
};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CollectionRow {
    pub id: i64,
    pub title: String,
    pub featured_product_id: Option<i64>,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = collections)]
#[diesel(treat_none_as_null = true)]
pub struct NewCollectionRow {
    pub title: String,
    pub featured_product_id: Option<i64>,
}

impl From<&CollectionDraft> for NewCollectionRow {
    fn from(draft: &CollectionDraft) -> Self {
        NewCollectionRow {
            title: draft.title.clone(),
            featured_product_id: draft.featured_product_id,
        }
    }
}

impl CollectionRow {
    pub fn into_collection(self, products_count: i64) -> Collection {
        Collection {
            id: self.id,
            title: self.title,
            featured_product_id: self.featured_product_id,
            products_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub inventory: i32,
    pub last_update: DateTime<Utc>,
    pub collection_id: i64,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct NewProductRow {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub inventory: i32,
    pub collection_id: i64,
}

impl From<&ProductDraft> for NewProductRow {
    fn from(draft: &ProductDraft) -> Self {
        NewProductRow {
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            unit_price: draft.unit_price.clone(),
            inventory: draft.inventory,
            collection_id: draft.collection_id,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            unit_price: row.unit_price,
            inventory: row.inventory,
            last_update: row.last_update,
            collection_id: row.collection_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = customers)]
#[diesel(treat_none_as_null = true)]
pub struct CustomerProfileChangeset {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
}

impl From<&ProfileUpdate> for CustomerProfileChangeset {
    fn from(update: &ProfileUpdate) -> Self {
        CustomerProfileChangeset {
            first_name: update.first_name.clone(),
            last_name: update.last_name.clone(),
            phone: update.phone.clone(),
            birth_date: update.birth_date,
        }
    }
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DomainError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let membership = row.membership.parse().map_err(|e: DomainError| {
            DomainError::Storage(format!("customer {}: {}", row.id, e))
        })?;
        Ok(Customer {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            birth_date: row.birth_date,
            membership,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = carts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Cart {
            id: row.id,
            created_at: row.created_at,
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = cart_items)]
#[diesel(belongs_to(CartRow, foreign_key = cart_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: i64,
    pub cart_id: Uuid,
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub cart_id: Uuid,
    pub product_id: i64,
    pub quantity: i32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        CartItem {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i64,
    pub placed_at: DateTime<Utc>,
    pub payment_status: String,
    pub customer_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub placed_at: DateTime<Utc>,
    pub payment_status: String,
    pub customer_id: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_status = row.payment_status.parse().map_err(|e: DomainError| {
            DomainError::Storage(format!("order {}: {}", row.id, e))
        })?;
        Ok(Order {
            id: row.id,
            customer_id: row.customer_id,
            placed_at: row.placed_at,
            payment_status,
        })
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl From<&NewOrderItem> for NewOrderItemRow {
    fn from(item: &NewOrderItem) -> Self {
        NewOrderItemRow {
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
        }
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = reviews)]
#[diesel(belongs_to(ProductRow, foreign_key = product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow {
    pub product_id: i64,
    pub name: String,
    pub description: String,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            description: row.description,
            date: row.date,
        }
    }
}

impl NewReviewRow {
    pub fn new(product_id: i64, draft: &ReviewDraft) -> Self {
        NewReviewRow {
            product_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = store_order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = store_order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
