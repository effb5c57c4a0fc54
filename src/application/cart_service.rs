use uuid::Uuid;

use crate::domain::cart::{merge_quantity, validate_quantity, CartLine, CartView};
use crate::domain::errors::DomainError;
use crate::domain::ports::{Transaction, UnitOfWork};

pub struct CartService<U> {
    uow: U,
}

impl<U: UnitOfWork> CartService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    pub fn create_cart(&self) -> Result<CartView, DomainError> {
        self.uow.atomically(|tx| {
            let cart = tx.insert_cart()?;
            log::debug!("created cart {}", cart.id);
            Ok(CartView {
                cart,
                lines: vec![],
            })
        })
    }

    pub fn get_cart(&self, cart_id: Uuid) -> Result<CartView, DomainError> {
        self.uow.atomically(|tx| {
            let cart = tx
                .find_cart(cart_id)?
                .ok_or(DomainError::NotFound("cart"))?;
            let lines = tx.cart_lines(cart_id)?;
            Ok(CartView { cart, lines })
        })
    }

    pub fn delete_cart(&self, cart_id: Uuid) -> Result<(), DomainError> {
        self.uow.atomically(|tx| match tx.delete_cart(cart_id)? {
            0 => Err(DomainError::NotFound("cart")),
            _ => Ok(()),
        })
    }

    pub fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        self.uow.atomically(|tx| {
            ensure_cart(tx, cart_id)?;
            tx.cart_lines(cart_id)
        })
    }

    /// Adds `quantity` of a product to the cart. Adding a product that is
    /// already there bumps the existing line instead of creating a new one.
    ///
    /// The cart row stays locked until commit, so a placement running at the
    /// same time either sees the new quantity or has already removed the cart.
    pub fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        self.uow.atomically(|tx| {
            lock_cart(tx, cart_id)?;
            let product = tx
                .find_product(product_id)?
                .ok_or(DomainError::NotFound("product"))?;
            validate_quantity(quantity)?;

            let item = match tx.find_cart_item_by_product(cart_id, product_id)? {
                Some(existing) => {
                    let merged = merge_quantity(existing.quantity, quantity)?;
                    tx.set_cart_item_quantity(cart_id, existing.id, merged)?
                        .ok_or(DomainError::NotFound("cart item"))?
                }
                None => tx.upsert_cart_item(cart_id, product_id, quantity)?,
            };
            Ok(CartLine { item, product })
        })
    }

    pub fn update_item(
        &self,
        cart_id: Uuid,
        item_id: i64,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        validate_quantity(quantity)?;
        self.uow.atomically(|tx| {
            lock_cart(tx, cart_id)?;
            let item = tx
                .set_cart_item_quantity(cart_id, item_id, quantity)?
                .ok_or(DomainError::NotFound("cart item"))?;
            let product = tx
                .find_product(item.product_id)?
                .ok_or(DomainError::NotFound("product"))?;
            Ok(CartLine { item, product })
        })
    }

    pub fn remove_item(&self, cart_id: Uuid, item_id: i64) -> Result<(), DomainError> {
        self.uow.atomically(|tx| {
            lock_cart(tx, cart_id)?;
            match tx.delete_cart_item(cart_id, item_id)? {
                0 => Err(DomainError::NotFound("cart item")),
                _ => Ok(()),
            }
        })
    }
}

fn ensure_cart(tx: &mut dyn Transaction, cart_id: Uuid) -> Result<(), DomainError> {
    match tx.find_cart(cart_id)? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound("cart")),
    }
}

/// Every write to a cart's items goes through the same row lock as placement.
fn lock_cart(tx: &mut dyn Transaction, cart_id: Uuid) -> Result<(), DomainError> {
    match tx.lock_cart(cart_id)? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound("cart")),
    }
}
