use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::{Cart, CartItem, CartLine};
use super::catalog::{Collection, CollectionDraft, Product, ProductDraft};
use super::customer::{Customer, ProfileUpdate};
use super::errors::DomainError;
use super::events::OrderCreated;
use super::order::{NewOrderItem, Order, OrderLine, PaymentStatus};
use super::review::{Review, ReviewDraft};

pub trait CatalogStore {
    fn find_product(&mut self, id: i64) -> Result<Option<Product>, DomainError>;
    fn list_products(&mut self) -> Result<Vec<Product>, DomainError>;
    fn lock_product(&mut self, id: i64) -> Result<Option<Product>, DomainError>;
    fn insert_product(&mut self, draft: &ProductDraft) -> Result<Product, DomainError>;
    fn update_product(
        &mut self,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, DomainError>;
    fn delete_product(&mut self, id: i64) -> Result<usize, DomainError>;
    /// Number of order items, across all orders, that reference the product.
    fn count_order_items_for_product(&mut self, id: i64) -> Result<i64, DomainError>;
}

pub trait CollectionStore {
    fn list_collections(&mut self) -> Result<Vec<Collection>, DomainError>;
    fn find_collection(&mut self, id: i64) -> Result<Option<Collection>, DomainError>;
    fn lock_collection(&mut self, id: i64) -> Result<Option<Collection>, DomainError>;
    fn insert_collection(&mut self, draft: &CollectionDraft) -> Result<Collection, DomainError>;
    fn update_collection(
        &mut self,
        id: i64,
        draft: &CollectionDraft,
    ) -> Result<Option<Collection>, DomainError>;
    fn delete_collection(&mut self, id: i64) -> Result<usize, DomainError>;
}

/// Reviews are always addressed through the product they belong to.
pub trait ReviewStore {
    fn list_reviews(&mut self, product_id: i64) -> Result<Vec<Review>, DomainError>;
    fn find_review(&mut self, product_id: i64, id: i64) -> Result<Option<Review>, DomainError>;
    fn insert_review(&mut self, product_id: i64, draft: &ReviewDraft)
        -> Result<Review, DomainError>;
    fn update_review(
        &mut self,
        product_id: i64,
        id: i64,
        draft: &ReviewDraft,
    ) -> Result<Option<Review>, DomainError>;
    fn delete_review(&mut self, product_id: i64, id: i64) -> Result<usize, DomainError>;
}

pub trait CustomerStore {
    fn find_customer(&mut self, id: i64) -> Result<Option<Customer>, DomainError>;
    fn find_customer_by_user(&mut self, user_id: i64) -> Result<Option<Customer>, DomainError>;
    fn update_customer(
        &mut self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Customer>, DomainError>;
}

pub trait CartStore {
    fn insert_cart(&mut self) -> Result<Cart, DomainError>;
    fn find_cart(&mut self, id: Uuid) -> Result<Option<Cart>, DomainError>;
    /// Like `find_cart`, but holds the row until the transaction ends.
    fn lock_cart(&mut self, id: Uuid) -> Result<Option<Cart>, DomainError>;
    fn cart_lines(&mut self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    fn find_cart_item_by_product(
        &mut self,
        cart_id: Uuid,
        product_id: i64,
    ) -> Result<Option<CartItem>, DomainError>;
    /// Inserts the item, or adds `quantity` to the existing (cart, product) row.
    fn upsert_cart_item(
        &mut self,
        cart_id: Uuid,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, DomainError>;
    fn set_cart_item_quantity(
        &mut self,
        cart_id: Uuid,
        item_id: i64,
        quantity: i32,
    ) -> Result<Option<CartItem>, DomainError>;
    fn delete_cart_item(&mut self, cart_id: Uuid, item_id: i64) -> Result<usize, DomainError>;
    /// Returns the number of carts removed, so callers can tell whether
    /// someone else got there first.
    fn delete_cart(&mut self, id: Uuid) -> Result<usize, DomainError>;
}

pub trait OrderStore {
    fn insert_order(
        &mut self,
        customer_id: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Order, DomainError>;
    fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<usize, DomainError>;
    fn find_order(&mut self, id: i64) -> Result<Option<Order>, DomainError>;
    fn lock_order(&mut self, id: i64) -> Result<Option<Order>, DomainError>;
    fn order_lines(&mut self, order_id: i64) -> Result<Vec<OrderLine>, DomainError>;
    fn list_orders_for_customer(&mut self, customer_id: i64) -> Result<Vec<Order>, DomainError>;
    fn set_payment_status(
        &mut self,
        order_id: i64,
        status: PaymentStatus,
    ) -> Result<usize, DomainError>;
    fn delete_order_items(&mut self, order_id: i64) -> Result<usize, DomainError>;
    fn delete_order(&mut self, id: i64) -> Result<usize, DomainError>;
}

/// Handle on an open transaction. Everything done through it commits or
/// rolls back together.
pub trait Transaction:
    CatalogStore + CollectionStore + ReviewStore + CustomerStore + CartStore + OrderStore
{
}

impl<T> Transaction for T where
    T: CatalogStore + CollectionStore + ReviewStore + CustomerStore + CartStore + OrderStore
{
}

pub trait UnitOfWork: Send + Sync + 'static {
    /// Runs `work` in a transaction: committed on `Ok`, rolled back on `Err`.
    fn atomically<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, DomainError>;
}

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &OrderCreated) -> Result<(), DomainError>;
}

impl<P: EventPublisher + ?Sized> EventPublisher for Arc<P> {
    fn publish(&self, event: &OrderCreated) -> Result<(), DomainError> {
        (**self).publish(event)
    }
}
