use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::dsl::count;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartItem, CartLine};
use crate::domain::catalog::{Collection, CollectionDraft, Product, ProductDraft};
use crate::domain::customer::{Customer, ProfileUpdate};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrderItem, Order, OrderLine, PaymentStatus};
use crate::domain::ports::{
    CartStore, CatalogStore, CollectionStore, CustomerStore, OrderStore, ReviewStore,
    Transaction, UnitOfWork,
};
use crate::domain::review::{Review, ReviewDraft};
use crate::schema::{
    cart_items, carts, collections, customers, order_items, orders, products, reviews,
};

use super::models::{
    CartItemRow, CartRow, CollectionRow, CustomerProfileChangeset, CustomerRow, NewCartItemRow,
    NewCartRow, NewCollectionRow, NewOrderItemRow, NewOrderRow, NewProductRow, NewReviewRow,
    OrderItemRow, OrderRow, ProductRow, ReviewRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}

// ── Unit of work ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UnitOfWork for DieselStore {
    fn atomically<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut tx = PgTransaction { conn: &mut **conn };
            work(&mut tx)
        })
    }
}

/// Store operations bound to one open PostgreSQL transaction.
struct PgTransaction<'a> {
    conn: &'a mut PgConnection,
}

impl CatalogStore for PgTransaction<'_> {
    fn find_product(&mut self, id: i64) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first::<ProductRow>(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list_products(&mut self) -> Result<Vec<Product>, DomainError> {
        let rows = products::table
            .select(ProductRow::as_select())
            .order((products::title.asc(), products::id.asc()))
            .load::<ProductRow>(self.conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn lock_product(&mut self, id: i64) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .for_update()
            .first::<ProductRow>(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn insert_product(&mut self, draft: &ProductDraft) -> Result<Product, DomainError> {
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow::from(draft))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(self.conn)?;
        Ok(row.into())
    }

    fn update_product(
        &mut self,
        id: i64,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, DomainError> {
        let row = diesel::update(products::table.find(id))
            .set((
                &NewProductRow::from(draft),
                products::last_update.eq(Utc::now()),
            ))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(self.conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn delete_product(&mut self, id: i64) -> Result<usize, DomainError> {
        // Cart items and reviews go with it; order items are RESTRICTed.
        let deleted = diesel::delete(products::table.find(id)).execute(self.conn)?;
        Ok(deleted)
    }

    fn count_order_items_for_product(&mut self, id: i64) -> Result<i64, DomainError> {
        let n = order_items::table
            .filter(order_items::product_id.eq(id))
            .count()
            .get_result::<i64>(self.conn)?;
        Ok(n)
    }
}

impl PgTransaction<'_> {
    fn products_in(&mut self, collection_id: i64) -> Result<i64, DomainError> {
        let n = products::table
            .filter(products::collection_id.eq(collection_id))
            .count()
            .get_result::<i64>(self.conn)?;
        Ok(n)
    }
}

impl CollectionStore for PgTransaction<'_> {
    fn list_collections(&mut self) -> Result<Vec<Collection>, DomainError> {
        let rows = collections::table
            .select(CollectionRow::as_select())
            .order(collections::id.asc())
            .load::<CollectionRow>(self.conn)?;
        let counts: HashMap<i64, i64> = products::table
            .group_by(products::collection_id)
            .select((products::collection_id, count(products::id)))
            .load::<(i64, i64)>(self.conn)?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let n = counts.get(&row.id).copied().unwrap_or(0);
                row.into_collection(n)
            })
            .collect())
    }

    fn find_collection(&mut self, id: i64) -> Result<Option<Collection>, DomainError> {
        let row = collections::table
            .find(id)
            .select(CollectionRow::as_select())
            .first::<CollectionRow>(self.conn)
            .optional()?;
        match row {
            Some(row) => {
                let n = self.products_in(row.id)?;
                Ok(Some(row.into_collection(n)))
            }
            None => Ok(None),
        }
    }

    fn lock_collection(&mut self, id: i64) -> Result<Option<Collection>, DomainError> {
        // Product inserts into this collection wait on the row lock.
        let row = collections::table
            .find(id)
            .select(CollectionRow::as_select())
            .for_update()
            .first::<CollectionRow>(self.conn)
            .optional()?;
        match row {
            Some(row) => {
                let n = self.products_in(row.id)?;
                Ok(Some(row.into_collection(n)))
            }
            None => Ok(None),
        }
    }

    fn insert_collection(&mut self, draft: &CollectionDraft) -> Result<Collection, DomainError> {
        let row = diesel::insert_into(collections::table)
            .values(&NewCollectionRow::from(draft))
            .returning(CollectionRow::as_returning())
            .get_result::<CollectionRow>(self.conn)?;
        Ok(row.into_collection(0))
    }

    fn update_collection(
        &mut self,
        id: i64,
        draft: &CollectionDraft,
    ) -> Result<Option<Collection>, DomainError> {
        let row = diesel::update(collections::table.find(id))
            .set(&NewCollectionRow::from(draft))
            .returning(CollectionRow::as_returning())
            .get_result::<CollectionRow>(self.conn)
            .optional()?;
        match row {
            Some(row) => {
                let n = self.products_in(row.id)?;
                Ok(Some(row.into_collection(n)))
            }
            None => Ok(None),
        }
    }

    fn delete_collection(&mut self, id: i64) -> Result<usize, DomainError> {
        let deleted = diesel::delete(collections::table.find(id)).execute(self.conn)?;
        Ok(deleted)
    }
}

impl ReviewStore for PgTransaction<'_> {
    fn list_reviews(&mut self, product_id: i64) -> Result<Vec<Review>, DomainError> {
        let rows = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .order(reviews::id.asc())
            .select(ReviewRow::as_select())
            .load::<ReviewRow>(self.conn)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    fn find_review(&mut self, product_id: i64, id: i64) -> Result<Option<Review>, DomainError> {
        let row = reviews::table
            .filter(reviews::id.eq(id))
            .filter(reviews::product_id.eq(product_id))
            .select(ReviewRow::as_select())
            .first::<ReviewRow>(self.conn)
            .optional()?;
        Ok(row.map(Review::from))
    }

    fn insert_review(
        &mut self,
        product_id: i64,
        draft: &ReviewDraft,
    ) -> Result<Review, DomainError> {
        let row = diesel::insert_into(reviews::table)
            .values(&NewReviewRow::new(product_id, draft))
            .returning(ReviewRow::as_returning())
            .get_result::<ReviewRow>(self.conn)?;
        Ok(row.into())
    }

    fn update_review(
        &mut self,
        product_id: i64,
        id: i64,
        draft: &ReviewDraft,
    ) -> Result<Option<Review>, DomainError> {
        let row = diesel::update(
            reviews::table
                .filter(reviews::id.eq(id))
                .filter(reviews::product_id.eq(product_id)),
        )
        .set((
            reviews::name.eq(&draft.name),
            reviews::description.eq(&draft.description),
        ))
        .returning(ReviewRow::as_returning())
        .get_result::<ReviewRow>(self.conn)
        .optional()?;
        Ok(row.map(Review::from))
    }

    fn delete_review(&mut self, product_id: i64, id: i64) -> Result<usize, DomainError> {
        let deleted = diesel::delete(
            reviews::table
                .filter(reviews::id.eq(id))
                .filter(reviews::product_id.eq(product_id)),
        )
        .execute(self.conn)?;
        Ok(deleted)
    }
}

impl CustomerStore for PgTransaction<'_> {
    fn find_customer(&mut self, id: i64) -> Result<Option<Customer>, DomainError> {
        customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first::<CustomerRow>(self.conn)
            .optional()?
            .map(Customer::try_from)
            .transpose()
    }

    fn find_customer_by_user(&mut self, user_id: i64) -> Result<Option<Customer>, DomainError> {
        customers::table
            .filter(customers::user_id.eq(user_id))
            .select(CustomerRow::as_select())
            .first::<CustomerRow>(self.conn)
            .optional()?
            .map(Customer::try_from)
            .transpose()
    }

    fn update_customer(
        &mut self,
        id: i64,
        update: &ProfileUpdate,
    ) -> Result<Option<Customer>, DomainError> {
        diesel::update(customers::table.find(id))
            .set(&CustomerProfileChangeset::from(update))
            .returning(CustomerRow::as_returning())
            .get_result::<CustomerRow>(self.conn)
            .optional()?
            .map(Customer::try_from)
            .transpose()
    }
}

impl CartStore for PgTransaction<'_> {
    fn insert_cart(&mut self) -> Result<Cart, DomainError> {
        let row = diesel::insert_into(carts::table)
            .values(&NewCartRow { id: Uuid::new_v4() })
            .returning(CartRow::as_returning())
            .get_result::<CartRow>(self.conn)?;
        Ok(row.into())
    }

    fn find_cart(&mut self, id: Uuid) -> Result<Option<Cart>, DomainError> {
        let row = carts::table
            .find(id)
            .select(CartRow::as_select())
            .first::<CartRow>(self.conn)
            .optional()?;
        Ok(row.map(Cart::from))
    }

    fn lock_cart(&mut self, id: Uuid) -> Result<Option<Cart>, DomainError> {
        // A second placement on the same cart blocks here until the first one
        // commits, then sees the row gone.
        let row = carts::table
            .find(id)
            .select(CartRow::as_select())
            .for_update()
            .first::<CartRow>(self.conn)
            .optional()?;
        Ok(row.map(Cart::from))
    }

    fn cart_lines(&mut self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let rows = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::cart_id.eq(cart_id))
            .order(cart_items::id.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load::<(CartItemRow, ProductRow)>(self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| CartLine {
                item: item.into(),
                product: product.into(),
            })
            .collect())
    }

    fn find_cart_item_by_product(
        &mut self,
        cart_id: Uuid,
        product_id: i64,
    ) -> Result<Option<CartItem>, DomainError> {
        let row = cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .filter(cart_items::product_id.eq(product_id))
            .select(CartItemRow::as_select())
            .first::<CartItemRow>(self.conn)
            .optional()?;
        Ok(row.map(CartItem::from))
    }

    fn upsert_cart_item(
        &mut self,
        cart_id: Uuid,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartItem, DomainError> {
        let row = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                cart_id,
                product_id,
                quantity,
            })
            .on_conflict((cart_items::cart_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
            .returning(CartItemRow::as_returning())
            .get_result::<CartItemRow>(self.conn)?;
        Ok(row.into())
    }

    fn set_cart_item_quantity(
        &mut self,
        cart_id: Uuid,
        item_id: i64,
        quantity: i32,
    ) -> Result<Option<CartItem>, DomainError> {
        let row = diesel::update(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq(cart_id)),
        )
        .set(cart_items::quantity.eq(quantity))
        .returning(CartItemRow::as_returning())
        .get_result::<CartItemRow>(self.conn)
        .optional()?;
        Ok(row.map(CartItem::from))
    }

    fn delete_cart_item(&mut self, cart_id: Uuid, item_id: i64) -> Result<usize, DomainError> {
        let deleted = diesel::delete(
            cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq(cart_id)),
        )
        .execute(self.conn)?;
        Ok(deleted)
    }

    fn delete_cart(&mut self, id: Uuid) -> Result<usize, DomainError> {
        // cart_items go with it through ON DELETE CASCADE.
        let deleted = diesel::delete(carts::table.find(id)).execute(self.conn)?;
        Ok(deleted)
    }
}

impl OrderStore for PgTransaction<'_> {
    fn insert_order(
        &mut self,
        customer_id: i64,
        placed_at: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                placed_at,
                payment_status: PaymentStatus::Pending.code().to_string(),
                customer_id,
            })
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(self.conn)?
            .try_into()
    }

    fn insert_order_items(&mut self, items: &[NewOrderItem]) -> Result<usize, DomainError> {
        let rows: Vec<NewOrderItemRow> = items.iter().map(NewOrderItemRow::from).collect();
        let written = diesel::insert_into(order_items::table)
            .values(&rows)
            .execute(self.conn)?;
        Ok(written)
    }

    fn find_order(&mut self, id: i64) -> Result<Option<Order>, DomainError> {
        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first::<OrderRow>(self.conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn lock_order(&mut self, id: i64) -> Result<Option<Order>, DomainError> {
        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .for_update()
            .first::<OrderRow>(self.conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn order_lines(&mut self, order_id: i64) -> Result<Vec<OrderLine>, DomainError> {
        let rows = order_items::table
            .inner_join(products::table)
            .filter(order_items::order_id.eq(order_id))
            .order(order_items::id.asc())
            .select((OrderItemRow::as_select(), ProductRow::as_select()))
            .load::<(OrderItemRow, ProductRow)>(self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| OrderLine {
                item: item.into(),
                product: product.into(),
            })
            .collect())
    }

    fn list_orders_for_customer(&mut self, customer_id: i64) -> Result<Vec<Order>, DomainError> {
        orders::table
            .filter(orders::customer_id.eq(customer_id))
            .order((orders::placed_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load::<OrderRow>(self.conn)?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    fn set_payment_status(
        &mut self,
        order_id: i64,
        status: PaymentStatus,
    ) -> Result<usize, DomainError> {
        let updated = diesel::update(orders::table.find(order_id))
            .set(orders::payment_status.eq(status.code()))
            .execute(self.conn)?;
        Ok(updated)
    }

    fn delete_order_items(&mut self, order_id: i64) -> Result<usize, DomainError> {
        let deleted = diesel::delete(order_items::table.filter(order_items::order_id.eq(order_id)))
            .execute(self.conn)?;
        Ok(deleted)
    }

    fn delete_order(&mut self, id: i64) -> Result<usize, DomainError> {
        let deleted = diesel::delete(orders::table.find(id)).execute(self.conn)?;
        Ok(deleted)
    }
}
