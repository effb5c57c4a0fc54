//! In-memory unit of work for service tests. A transaction works on a copy of
//! the state and swaps it in only when the closure returns `Ok`.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cart::{merge_quantity, Cart, CartItem, CartLine};
use crate::domain::catalog::{Collection, CollectionDraft, Product, ProductDraft};
use crate::domain::customer::{Customer, Membership, ProfileUpdate};
use crate::domain::errors::DomainError;
use crate::domain::events::OrderCreated;
use crate::domain::order::{NewOrderItem, Order, OrderItem, OrderLine, PaymentStatus};
use crate::domain::ports::{
    CartStore, CatalogStore, CollectionStore, CustomerStore, EventPublisher, OrderStore,
    ReviewStore, Transaction, UnitOfWork,
};
use crate::domain::review::{Review, ReviewDraft};

/// Collection a seeded product lands in unless the test names one.
pub const DEFAULT_COLLECTION: &str = "Uncategorised";

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub collections: BTreeMap<i64, (String, Option<i64>)>,
    pub products: BTreeMap<i64, Product>,
    pub reviews: BTreeMap<i64, Review>,
    pub customers: BTreeMap<i64, Customer>,
    pub carts: BTreeMap<Uuid, Cart>,
    pub cart_items: BTreeMap<i64, CartItem>,
    pub orders: BTreeMap<i64, Order>,
    pub order_items: BTreeMap<i64, OrderItem>,
    pub fail_order_items: bool,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn collection(&self, id: i64) -> Option<Collection> {
        self.collections
            .get(&id)
            .map(|(title, featured_product_id)| Collection {
                id,
                title: title.clone(),
                featured_product_id: *featured_product_id,
                products_count: self
                    .products
                    .values()
                    .filter(|p| p.collection_id == id)
                    .count() as i64,
            })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().expect("memory store poisoned").clone()
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        f(&mut self.state.lock().expect("memory store poisoned"))
    }

    pub fn seed_collection(&self, title: &str) -> i64 {
        self.update(|s| {
            let id = s.next_id();
            s.collections.insert(id, (title.to_string(), None));
            id
        })
    }

    pub fn seed_product(&self, title: &str, price: &str) -> i64 {
        let existing = self.update(|s| {
            s.collections
                .iter()
                .find(|(_, (t, _))| t == DEFAULT_COLLECTION)
                .map(|(id, _)| *id)
        });
        let collection_id = match existing {
            Some(id) => id,
            None => self.seed_collection(DEFAULT_COLLECTION),
        };
        self.seed_product_in(collection_id, title, price)
    }

    pub fn seed_product_in(&self, collection_id: i64, title: &str, price: &str) -> i64 {
        self.update(|s| {
            let id = s.next_id();
            s.products.insert(
                id,
                Product {
                    id,
                    title: title.to_string(),
                    slug: title.to_lowercase().replace(' ', "-"),
                    description: None,
                    unit_price: BigDecimal::from_str(price).expect("valid decimal"),
                    inventory: 10,
                    last_update: Utc::now(),
                    collection_id,
                },
            );
            id
        })
    }

    pub fn set_price(&self, product_id: i64, price: &str) {
        self.update(|s| {
            let product = s.products.get_mut(&product_id).expect("known product");
            product.unit_price = BigDecimal::from_str(price).expect("valid decimal");
        })
    }

    pub fn seed_customer(&self, user_id: i64, first_name: &str, last_name: &str) -> i64 {
        self.update(|s| {
            let id = s.next_id();
            s.customers.insert(
                id,
                Customer {
                    id,
                    user_id,
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    phone: "555-0100".to_string(),
                    birth_date: None,
                    membership: Membership::Bronze,
                },
            );
            id
        })
    }
}

impl UnitOfWork for MemoryStore {
    fn atomically<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, DomainError>,
    {
        let mut committed = self
            .state
            .lock()
            .map_err(|_| DomainError::Storage("memory store poisoned".to_string()))?;
        let mut working = committed.clone();
        let out = work(&mut working)?;
        *committed = working;
        Ok(out)
    }
}

impl CatalogStore for MemoryState {
    fn find_product(&mut self, id: i64) -> Result<Option<Product>, DomainError> {
        Ok(self.products.get(&id).cloned())
    }

    fn list_products(&mut self) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self.products.values().cloned().collect();
        products.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    fn lock_product(&mut self, id: i64) -> Result<Option<Product>, DomainError> {
        self.find_product(id)
    }

    fn insert_product(&mut self, draft: &ProductDraft) -> Result<Product, DomainError> {
        if !self.collections.contains_key(&draft.collection_id) {
            return Err(DomainError::Storage("products_collection_id_fkey".to_string()));
        }
        let product = Product {
            id: self.next_id(),
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            description: draft.description.clone(),
            unit_price: draft.unit_price.clone(),
            inventory: draft.inventory,
            last_update: Utc::now(),
            collection_id: draft.collection_id,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn update_product(
        &mut self,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, DomainError> {
        if !self.collections.contains_key(&draft.collection_id) {
            return Err(DomainError::Storage("products_collection_id_fkey".to_string()));
        }
        Ok(self.products.get_mut(&id).map(|p| {
            p.title = draft.title.clone();
            p.slug = draft.slug.clone();
            p.description = draft.description.clone();
            p.unit_price = draft.unit_price.clone();
            p.inventory = draft.inventory;
            p.collection_id = draft.collection_id;
            p.last_update = Utc::now();
            p.clone()
        }))
    }

    fn delete_product(&mut self, id: i64) -> Result<usize, DomainError> {
        if self.order_items.values().any(|i| i.product_id == id) {
            return Err(DomainError::Storage("order_items_product_id_fkey".to_string()));
        }
        if self.products.remove(&id).is_none() {
            return Ok(0);
        }
        self.cart_items.retain(|_, item| item.product_id != id);
        self.reviews.retain(|_, review| review.product_id != id);
        for (_, featured) in self.collections.values_mut() {
            if *featured == Some(id) {
                *featured = None;
            }
        }
        Ok(1)
    }

    fn count_order_items_for_product(&mut self, id: i64) -> Result<i64, DomainError> {
        Ok(self
            .order_items
            .values()
            .filter(|i| i.product_id == id)
            .count() as i64)
    }
}

impl CollectionStore for MemoryState {
    fn list_collections(&mut self) -> Result<Vec<Collection>, DomainError> {
        Ok(self
            .collections
            .keys()
            .filter_map(|id| self.collection(*id))
            .collect())
    }

    fn find_collection(&mut self, id: i64) -> Result<Option<Collection>, DomainError> {
        Ok(self.collection(id))
    }

    fn lock_collection(&mut self, id: i64) -> Result<Option<Collection>, DomainError> {
        Ok(self.collection(id))
    }

    fn insert_collection(&mut self, draft: &CollectionDraft) -> Result<Collection, DomainError> {
        let id = self.next_id();
        self.collections
            .insert(id, (draft.title.clone(), draft.featured_product_id));
        self.collection(id)
            .ok_or_else(|| DomainError::Storage("collection vanished".to_string()))
    }

    fn update_collection(
        &mut self,
        id: i64,
        draft: &CollectionDraft,
    ) -> Result<Option<Collection>, DomainError> {
        match self.collections.get_mut(&id) {
            Some(entry) => *entry = (draft.title.clone(), draft.featured_product_id),
            None => return Ok(None),
        }
        Ok(self.collection(id))
    }

    fn delete_collection(&mut self, id: i64) -> Result<usize, DomainError> {
        if self.products.values().any(|p| p.collection_id == id) {
            return Err(DomainError::Storage("products_collection_id_fkey".to_string()));
        }
        Ok(self.collections.remove(&id).map_or(0, |_| 1))
    }
}

impl ReviewStore for MemoryState {
    fn list_reviews(&mut self, product_id: i64) -> Result<Vec<Review>, DomainError> {
        Ok(self
            .reviews
            .values()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    fn find_review(&mut self, product_id: i64, id: i64) -> Result<Option<Review>, DomainError> {
        Ok(self
            .reviews
            .get(&id)
            .filter(|r| r.product_id == product_id)
            .cloned())
    }

    fn insert_review(
        &mut self,
        product_id: i64,
        draft: &ReviewDraft,
    ) -> Result<Review, DomainError> {
        let review = Review {
            id: self.next_id(),
            product_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            date: Utc::now(),
        };
        self.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    fn update_review(
        &mut self,
        product_id: i64,
        id: i64,
        draft: &ReviewDraft,
    ) -> Result<Option<Review>, DomainError> {
        Ok(self
            .reviews
            .get_mut(&id)
            .filter(|r| r.product_id == product_id)
            .map(|r| {
                r.name = draft.name.clone();
                r.description = draft.description.clone();
                r.clone()
            }))
    }

    fn delete_review(&mut self, product_id: i64, id: i64) -> Result<usize, DomainError> {
        match self.reviews.get(&id) {
            Some(review) if review.product_id == product_id => {
                self.reviews.remove(&id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl CustomerStore for MemoryState {
    fn find_customer(&mut self, id: i64) -> Result<Option<Customer>, DomainError> {
        Ok(self.customers.get(&id).cloned())
    }

    fn find_customer_by_user(&mut self, user_id: i64) -> Result<Option<Customer>, DomainError> {
        Ok(self
            .customers
            .values()
            .find(|c| c.user_id == user_id)
            .cloned())
    }

    fn update_customer(
        &mut self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Customer>, DomainError> {
        Ok(self.customers.get_mut(&id).map(|c| {
            c.first_name = update.first_name.clone();
            c.last_name = update.last_name.clone();
            c.phone = update.phone.clone();
            c.birth_date = update.birth_date;
            c.clone()
        }))
    }
}

impl CartStore for MemoryState {
    fn insert_cart(&mut self) -> Result<Cart, DomainError> {
        let cart = Cart {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    fn find_cart(&mut self, id: Uuid) -> Result<Option<Cart>, DomainError> {
        Ok(self.carts.get(&id).cloned())
    }

    fn lock_cart(&mut self, id: Uuid) -> Result<Option<Cart>, DomainError> {
        self.find_cart(id)
    }

    fn cart_lines(&mut self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        self.cart_items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .map(|item| {
                let product = self
                    .products
                    .get(&item.product_id)
                    .cloned()
                    .ok_or_else(|| DomainError::Storage("dangling product".to_string()))?;
                Ok(CartLine {
                    item: item.clone(),
                    product,
                })
            })
            .collect()
    }

    fn find_cart_item_by_product(
        &mut self,
        cart_id: Uuid,
        product_id: i64,
    ) -> Result<Option<CartItem>, DomainError> {
        Ok(self
            .cart_items
            .values()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
            .cloned())
    }

    fn upsert_cart_item(
        &mut self,
        cart_id: Uuid,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        if let Some(existing) = self
            .cart_items
            .values_mut()
            .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        {
            existing.quantity = merge_quantity(existing.quantity, quantity)?;
            return Ok(existing.clone());
        }
        let id = self.next_id();
        let item = CartItem {
            id,
            cart_id,
            product_id,
            quantity,
        };
        self.cart_items.insert(id, item.clone());
        Ok(item)
    }

    fn set_cart_item_quantity(
        &mut self,
        cart_id: Uuid,
        item_id: i64,
        quantity: i32,
    ) -> Result<Option<CartItem>, DomainError> {
        Ok(self
            .cart_items
            .get_mut(&item_id)
            .filter(|i| i.cart_id == cart_id)
            .map(|i| {
                i.quantity = quantity;
                i.clone()
            }))
    }

    fn delete_cart_item(&mut self, cart_id: Uuid, item_id: i64) -> Result<usize, DomainError> {
        match self.cart_items.get(&item_id) {
            Some(item) if item.cart_id == cart_id => {
                self.cart_items.remove(&item_id);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn delete_cart(&mut self, id: Uuid) -> Result<usize, DomainError> {
        if self.carts.remove(&id).is_none() {
            return Ok(0);
        }
        self.cart_items.retain(|_, item| item.cart_id != id);
        Ok(1)
    }
}

impl OrderStore for MemoryState {
    fn insert_order(
        &mut self,
        customer_id: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let order = Order {
            id: self.next_id(),
            customer_id,
            placed_at,
            payment_status: PaymentStatus::Pending,
        };
        self.orders.insert(order.id, order.clone());
        Ok(order)
    }

    fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<usize, DomainError> {
        if self.fail_order_items {
            return Err(DomainError::Storage("injected order_items failure".to_string()));
        }
        for item in items {
            let id = self.next_id();
            self.order_items.insert(
                id,
                OrderItem {
                    id,
                    order_id: item.order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.unit_price.clone(),
                },
            );
        }
        Ok(items.len())
    }

    fn find_order(&mut self, id: i64) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.get(&id).cloned())
    }

    fn lock_order(&mut self, id: i64) -> Result<Option<Order>, DomainError> {
        self.find_order(id)
    }

    fn order_lines(&mut self, order_id: i64) -> Result<Vec<OrderLine>, DomainError> {
        self.order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .map(|item| {
                let product = self
                    .products
                    .get(&item.product_id)
                    .cloned()
                    .ok_or_else(|| DomainError::Storage("dangling product".to_string()))?;
                Ok(OrderLine {
                    item: item.clone(),
                    product,
                })
            })
            .collect()
    }

    fn list_orders_for_customer(&mut self, customer_id: i64) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    fn set_payment_status(
        &mut self,
        order_id: i64,
        status: PaymentStatus,
    ) -> Result<usize, DomainError> {
        Ok(match self.orders.get_mut(&order_id) {
            Some(order) => {
                order.payment_status = status;
                1
            }
            None => 0,
        })
    }

    fn delete_order_items(&mut self, order_id: i64) -> Result<usize, DomainError> {
        let before = self.order_items.len();
        self.order_items.retain(|_, item| item.order_id != order_id);
        Ok(before - self.order_items.len())
    }

    fn delete_order(&mut self, id: i64) -> Result<usize, DomainError> {
        if self.order_items.values().any(|i| i.order_id == id) {
            return Err(DomainError::Storage("order_items_order_id_fkey".to_string()));
        }
        Ok(self.orders.remove(&id).map_or(0, |_| 1))
    }
}

/// Keeps every published event; can be told to refuse delivery.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<OrderCreated>>,
    pub fail: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail: true,
        }
    }

    pub fn published(&self) -> Vec<OrderCreated> {
        self.events.lock().expect("publisher poisoned").clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &OrderCreated) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::Delivery("broker unavailable".to_string()));
        }
        self.events
            .lock()
            .expect("publisher poisoned")
            .push(event.clone());
        Ok(())
    }
}
