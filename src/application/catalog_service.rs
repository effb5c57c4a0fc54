use crate::domain::catalog::{Collection, CollectionDraft, Product, ProductDraft};
use crate::domain::errors::DomainError;
use crate::domain::ports::{Transaction, UnitOfWork};
use crate::domain::review::{Review, ReviewDraft};

/// Products, the collections they are filed under, and their reviews.
pub struct CatalogService<U> {
    uow: U,
}

impl<U: UnitOfWork> CatalogService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    // ── Products ─────────────────────────────────────────────────────────────

    pub fn get_product(&self, product_id: i64) -> Result<Product, DomainError> {
        self.uow.atomically(|tx| {
            tx.find_product(product_id)?
                .ok_or(DomainError::NotFound("product"))
        })
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.uow.atomically(|tx| tx.list_products())
    }

    pub fn create_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        draft.validate()?;
        let product = self.uow.atomically(|tx| {
            ensure_collection(tx, draft.collection_id)?;
            tx.insert_product(&draft)
        })?;
        log::info!("created product {} ({})", product.id, product.slug);
        Ok(product)
    }

    pub fn update_product(
        &self,
        product_id: i64,
        draft: ProductDraft,
    ) -> Result<Product, DomainError> {
        draft.validate()?;
        self.uow.atomically(|tx| {
            ensure_collection(tx, draft.collection_id)?;
            tx.update_product(product_id, &draft)?
                .ok_or(DomainError::NotFound("product"))
        })
    }

    /// Products that appear on an order cannot be deleted.
    pub fn delete_product(&self, product_id: i64) -> Result<(), DomainError> {
        self.uow.atomically(|tx| {
            tx.lock_product(product_id)?
                .ok_or(DomainError::NotFound("product"))?;
            if tx.count_order_items_for_product(product_id)? > 0 {
                return Err(DomainError::NotAllowed(
                    "Product cannot be deleted because it is associated with an order item."
                        .to_string(),
                ));
            }
            tx.delete_product(product_id)?;
            Ok(())
        })?;
        log::info!("deleted product {}", product_id);
        Ok(())
    }

    // ── Collections ──────────────────────────────────────────────────────────

    pub fn list_collections(&self) -> Result<Vec<Collection>, DomainError> {
        self.uow.atomically(|tx| tx.list_collections())
    }

    pub fn get_collection(&self, collection_id: i64) -> Result<Collection, DomainError> {
        self.uow.atomically(|tx| {
            tx.find_collection(collection_id)?
                .ok_or(DomainError::NotFound("collection"))
        })
    }

    pub fn create_collection(&self, draft: CollectionDraft) -> Result<Collection, DomainError> {
        draft.validate()?;
        self.uow.atomically(|tx| {
            ensure_featured_product(tx, draft.featured_product_id)?;
            tx.insert_collection(&draft)
        })
    }

    pub fn update_collection(
        &self,
        collection_id: i64,
        draft: CollectionDraft,
    ) -> Result<Collection, DomainError> {
        draft.validate()?;
        self.uow.atomically(|tx| {
            ensure_featured_product(tx, draft.featured_product_id)?;
            tx.update_collection(collection_id, &draft)?
                .ok_or(DomainError::NotFound("collection"))
        })
    }

    /// Only empty collections can be deleted.
    pub fn delete_collection(&self, collection_id: i64) -> Result<(), DomainError> {
        self.uow.atomically(|tx| {
            let collection = tx
                .lock_collection(collection_id)?
                .ok_or(DomainError::NotFound("collection"))?;
            if collection.products_count > 0 {
                return Err(DomainError::NotAllowed(
                    "Collection cannot be deleted because it includes one or more products."
                        .to_string(),
                ));
            }
            tx.delete_collection(collection_id)?;
            Ok(())
        })
    }

    // ── Reviews ──────────────────────────────────────────────────────────────

    pub fn list_reviews(&self, product_id: i64) -> Result<Vec<Review>, DomainError> {
        self.uow.atomically(|tx| {
            ensure_product(tx, product_id)?;
            tx.list_reviews(product_id)
        })
    }

    pub fn get_review(&self, product_id: i64, review_id: i64) -> Result<Review, DomainError> {
        self.uow.atomically(|tx| {
            ensure_product(tx, product_id)?;
            tx.find_review(product_id, review_id)?
                .ok_or(DomainError::NotFound("review"))
        })
    }

    pub fn create_review(
        &self,
        product_id: i64,
        draft: ReviewDraft,
    ) -> Result<Review, DomainError> {
        self.uow.atomically(|tx| {
            ensure_product(tx, product_id)?;
            draft.validate()?;
            tx.insert_review(product_id, &draft)
        })
    }

    pub fn update_review(
        &self,
        product_id: i64,
        review_id: i64,
        draft: ReviewDraft,
    ) -> Result<Review, DomainError> {
        self.uow.atomically(|tx| {
            ensure_product(tx, product_id)?;
            draft.validate()?;
            tx.update_review(product_id, review_id, &draft)?
                .ok_or(DomainError::NotFound("review"))
        })
    }

    pub fn delete_review(&self, product_id: i64, review_id: i64) -> Result<(), DomainError> {
        self.uow.atomically(|tx| {
            ensure_product(tx, product_id)?;
            match tx.delete_review(product_id, review_id)? {
                0 => Err(DomainError::NotFound("review")),
                _ => Ok(()),
            }
        })
    }
}

fn ensure_product(tx: &mut dyn Transaction, product_id: i64) -> Result<(), DomainError> {
    match tx.find_product(product_id)? {
        Some(_) => Ok(()),
        None => Err(DomainError::NotFound("product")),
    }
}

// Unknown references in a request body are field errors.
fn ensure_collection(tx: &mut dyn Transaction, collection_id: i64) -> Result<(), DomainError> {
    match tx.find_collection(collection_id)? {
        Some(_) => Ok(()),
        None => Err(DomainError::invalid_input(
            "collection",
            format!("collection {collection_id} does not exist"),
        )),
    }
}

fn ensure_featured_product(
    tx: &mut dyn Transaction,
    product_id: Option<i64>,
) -> Result<(), DomainError> {
    let Some(product_id) = product_id else {
        return Ok(());
    };
    match tx.find_product(product_id)? {
        Some(_) => Ok(()),
        None => Err(DomainError::invalid_input(
            "featured_product",
            format!("product {product_id} does not exist"),
        )),
    }
}
