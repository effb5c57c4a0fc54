use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::events::OrderCreated;
use crate::domain::order::{NewOrderItem, OrderView, PaymentStatus};
use crate::domain::ports::{EventPublisher, Transaction, UnitOfWork};

pub struct OrderService<U, P> {
    uow: U,
    publisher: P,
}

impl<U: UnitOfWork, P: EventPublisher> OrderService<U, P> {
    pub fn new(uow: U, publisher: P) -> Self {
        Self { uow, publisher }
    }

    /// Turns the cart into a pending order owned by the customer behind
    /// `user_id`, then deletes the cart.
    ///
    /// Everything from locking the cart to deleting it happens in one
    /// transaction. A cart can only be placed once: any later call, including
    /// a concurrent one that lost the race, gets `NotFound("cart")`.
    ///
    /// `OrderCreated` is published after commit. A delivery failure is logged
    /// and does not affect the result.
    pub fn place_order(&self, cart_id: Uuid, user_id: i64) -> Result<OrderView, DomainError> {
        let order = self
            .uow
            .atomically(|tx| convert_cart(tx, cart_id, user_id))
            .map_err(DomainError::into_transaction_failure)?;

        log::info!(
            "placed order {} from cart {} ({} item(s))",
            order.order.id,
            cart_id,
            order.lines.len()
        );

        let event = OrderCreated { order };
        if let Err(e) = self.publisher.publish(&event) {
            log::warn!(
                "could not publish {} for order {}: {}",
                event.name(),
                event.order_id(),
                e
            );
        }
        Ok(event.order)
    }

    pub fn get_order(&self, user_id: i64, order_id: i64) -> Result<OrderView, DomainError> {
        self.uow.atomically(|tx| {
            let customer = tx
                .find_customer_by_user(user_id)?
                .ok_or(DomainError::NotFound("customer"))?;
            let order = tx
                .find_order(order_id)?
                .filter(|o| o.customer_id == customer.id)
                .ok_or(DomainError::NotFound("order"))?;
            let lines = tx.order_lines(order.id)?;
            Ok(OrderView {
                order,
                customer,
                lines,
            })
        })
    }

    /// The caller's orders, newest first.
    pub fn list_orders(&self, user_id: i64) -> Result<Vec<OrderView>, DomainError> {
        self.uow.atomically(|tx| {
            let customer = tx
                .find_customer_by_user(user_id)?
                .ok_or(DomainError::NotFound("customer"))?;
            tx.list_orders_for_customer(customer.id)?
                .into_iter()
                .map(|order| {
                    let lines = tx.order_lines(order.id)?;
                    Ok(OrderView {
                        order,
                        customer: customer.clone(),
                        lines,
                    })
                })
                .collect()
        })
    }

    pub fn update_payment_status(
        &self,
        order_id: i64,
        status: PaymentStatus,
    ) -> Result<OrderView, DomainError> {
        self.uow.atomically(|tx| {
            let mut order = tx
                .lock_order(order_id)?
                .ok_or(DomainError::NotFound("order"))?;
            if !order.payment_status.can_transition_to(status) {
                return Err(DomainError::InvalidState(format!(
                    "payment status {} cannot change to {}",
                    order.payment_status, status
                )));
            }
            tx.set_payment_status(order_id, status)?;
            order.payment_status = status;

            let customer = tx
                .find_customer(order.customer_id)?
                .ok_or(DomainError::NotFound("customer"))?;
            let lines = tx.order_lines(order.id)?;
            Ok(OrderView {
                order,
                customer,
                lines,
            })
        })
    }

    /// Removes the order and its items together, returning what was deleted.
    pub fn delete_order(&self, order_id: i64) -> Result<OrderView, DomainError> {
        let view = self.uow.atomically(|tx| {
            let order = tx
                .lock_order(order_id)?
                .ok_or(DomainError::NotFound("order"))?;
            let customer = tx
                .find_customer(order.customer_id)?
                .ok_or(DomainError::NotFound("customer"))?;
            let lines = tx.order_lines(order.id)?;

            tx.delete_order_items(order.id)?;
            if tx.delete_order(order.id)? != 1 {
                return Err(DomainError::NotFound("order"));
            }
            Ok(OrderView {
                order,
                customer,
                lines,
            })
        })?;

        log::info!("deleted order {} ({} item(s))", order_id, view.lines.len());
        Ok(view)
    }
}

fn convert_cart(
    tx: &mut dyn Transaction,
    cart_id: Uuid,
    user_id: i64,
) -> Result<OrderView, DomainError> {
    // Preconditions first; nothing has been written until they all hold.
    tx.lock_cart(cart_id)?
        .ok_or(DomainError::NotFound("cart"))?;
    let lines = tx.cart_lines(cart_id)?;
    if lines.is_empty() {
        return Err(DomainError::InvalidState("cart empty".to_string()));
    }
    let customer = tx
        .find_customer_by_user(user_id)?
        .ok_or(DomainError::NotFound("customer"))?;

    // Inventory is neither checked nor decremented here.
    let order = tx.insert_order(customer.id, Utc::now())?;

    let items: Vec<NewOrderItem> = lines
        .iter()
        .map(|line| NewOrderItem::snapshot(order.id, line))
        .collect();
    let written = tx.insert_order_items(&items)?;
    if written != items.len() {
        return Err(DomainError::TransactionFailure(format!(
            "expected {} order items for order {}, wrote {}",
            items.len(),
            order.id,
            written
        )));
    }

    if tx.delete_cart(cart_id)? != 1 {
        return Err(DomainError::NotFound("cart"));
    }

    let lines = tx.order_lines(order.id)?;
    Ok(OrderView {
        order,
        customer,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use uuid::Uuid;

    use super::OrderService;
    use crate::application::cart_service::CartService;
    use crate::domain::errors::DomainError;
    use crate::domain::order::PaymentStatus;
    use crate::infrastructure::memory::{MemoryStore, RecordingPublisher};

    struct Fixture {
        store: MemoryStore,
        carts: CartService<MemoryStore>,
        orders: OrderService<MemoryStore, Arc<RecordingPublisher>>,
        publisher: Arc<RecordingPublisher>,
    }

    fn fixture_with(publisher: RecordingPublisher) -> Fixture {
        let store = MemoryStore::default();
        let publisher = Arc::new(publisher);
        Fixture {
            carts: CartService::new(store.clone()),
            orders: OrderService::new(store.clone(), publisher.clone()),
            store,
            publisher,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingPublisher::default())
    }

    /// Cart c1 = {A: 2 @ 10.00, B: 1 @ 5.00}, customer behind user 7.
    fn sample_cart(f: &Fixture) -> (Uuid, i64, i64) {
        let a = f.store.seed_product("Product A", "10.00");
        let b = f.store.seed_product("Product B", "5.00");
        f.store.seed_customer(7, "Ada", "Lovelace");
        let cart_id = f.carts.create_cart().expect("create cart").cart.id;
        f.carts.upsert_item(cart_id, a, 2).expect("add A");
        f.carts.upsert_item(cart_id, b, 1).expect("add B");
        (cart_id, a, b)
    }

    #[test]
    fn worked_example_totals_25() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);

        let order = f.orders.place_order(cart_id, 7).expect("place order");

        assert_eq!(order.total_order_price().to_string(), "25.00");
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.customer.user_id, 7);
        assert!(matches!(
            f.carts.get_cart(cart_id),
            Err(DomainError::NotFound("cart"))
        ));
    }

    #[test]
    fn one_order_item_per_cart_item_and_cart_items_removed() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);

        let order = f.orders.place_order(cart_id, 7).expect("place order");

        let state = f.store.snapshot();
        assert_eq!(state.orders.len(), 1);
        assert_eq!(
            state
                .order_items
                .values()
                .filter(|i| i.order_id == order.order.id)
                .count(),
            2
        );
        assert!(state.cart_items.values().all(|i| i.cart_id != cart_id));
    }

    #[test]
    fn missing_cart_is_not_found() {
        let f = fixture();
        f.store.seed_customer(7, "Ada", "Lovelace");

        assert!(matches!(
            f.orders.place_order(Uuid::new_v4(), 7),
            Err(DomainError::NotFound("cart"))
        ));
    }

    #[test]
    fn empty_cart_is_invalid_state_and_untouched() {
        let f = fixture();
        f.store.seed_customer(7, "Ada", "Lovelace");
        let cart_id = f.carts.create_cart().expect("create cart").cart.id;

        assert!(matches!(
            f.orders.place_order(cart_id, 7),
            Err(DomainError::InvalidState(reason)) if reason == "cart empty"
        ));
        let cart = f.carts.get_cart(cart_id).expect("cart still there");
        assert!(cart.lines.is_empty());
        assert!(f.store.snapshot().orders.is_empty());
    }

    #[test]
    fn unknown_customer_is_not_found_and_cart_kept() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);

        assert!(matches!(
            f.orders.place_order(cart_id, 999),
            Err(DomainError::NotFound("customer"))
        ));
        assert_eq!(f.carts.get_cart(cart_id).expect("cart kept").lines.len(), 2);
    }

    #[test]
    fn failed_item_write_rolls_everything_back() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);
        f.store.update(|s| s.fail_order_items = true);

        assert!(matches!(
            f.orders.place_order(cart_id, 7),
            Err(DomainError::TransactionFailure(_))
        ));

        let state = f.store.snapshot();
        assert!(state.orders.is_empty(), "no order without items may persist");
        assert!(state.order_items.is_empty());
        assert_eq!(f.carts.get_cart(cart_id).expect("cart intact").lines.len(), 2);
        assert!(f.publisher.published().is_empty());

        // Once storage recovers the same cart goes through.
        f.store.update(|s| s.fail_order_items = false);
        assert!(f.orders.place_order(cart_id, 7).is_ok());
    }

    #[test]
    fn second_placement_of_same_cart_is_not_found() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);

        f.orders.place_order(cart_id, 7).expect("first placement");
        assert!(matches!(
            f.orders.place_order(cart_id, 7),
            Err(DomainError::NotFound("cart"))
        ));
        assert_eq!(f.store.snapshot().orders.len(), 1);
    }

    #[test]
    fn later_price_changes_do_not_touch_placed_orders() {
        let f = fixture();
        let (cart_id, a, _) = sample_cart(&f);
        let order = f.orders.place_order(cart_id, 7).expect("place order");

        f.store.set_price(a, "99.00");

        let reloaded = f.orders.get_order(7, order.order.id).expect("get order");
        let line = reloaded
            .lines
            .iter()
            .find(|l| l.product.id == a)
            .expect("line for A");
        assert_eq!(line.item.unit_price.to_string(), "10.00");
        assert_eq!(line.product.unit_price.to_string(), "99.00");
        assert_eq!(reloaded.total_order_price().to_string(), "25.00");
    }

    #[test]
    fn publishes_order_created_after_commit() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);

        let order = f.orders.place_order(cart_id, 7).expect("place order");

        let events = f.publisher.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "order_created");
        assert_eq!(events[0].order_id(), order.order.id);
    }

    #[test]
    fn publish_failure_does_not_fail_placement() {
        let f = fixture_with(RecordingPublisher::failing());
        let (cart_id, _, _) = sample_cart(&f);

        let order = f.orders.place_order(cart_id, 7).expect("placement still succeeds");

        assert_eq!(order.lines.len(), 2);
        assert_eq!(f.store.snapshot().orders.len(), 1);
        assert!(f.store.snapshot().carts.is_empty());
    }

    #[test]
    fn concurrent_placements_yield_one_order() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);
        let barrier = Barrier::new(2);

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        f.orders.place_order(cart_id, 7)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("placement thread panicked"))
                .collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(DomainError::NotFound("cart"))))
                .count(),
            1
        );
        assert_eq!(f.store.snapshot().orders.len(), 1);
    }

    #[test]
    fn orders_are_scoped_to_their_customer() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);
        f.store.seed_customer(8, "Grace", "Hopper");
        let order = f.orders.place_order(cart_id, 7).expect("place order");

        assert!(f.orders.get_order(7, order.order.id).is_ok());
        assert!(matches!(
            f.orders.get_order(8, order.order.id),
            Err(DomainError::NotFound("order"))
        ));
        assert_eq!(f.orders.list_orders(7).expect("list").len(), 1);
        assert!(f.orders.list_orders(8).expect("list").is_empty());
    }

    #[test]
    fn payment_status_settles_once() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);
        let order = f.orders.place_order(cart_id, 7).expect("place order");

        let settled = f
            .orders
            .update_payment_status(order.order.id, PaymentStatus::Completed)
            .expect("pending -> completed");
        assert_eq!(settled.order.payment_status, PaymentStatus::Completed);

        assert!(matches!(
            f.orders
                .update_payment_status(order.order.id, PaymentStatus::Failed),
            Err(DomainError::InvalidState(_))
        ));
        assert!(matches!(
            f.orders.update_payment_status(12345, PaymentStatus::Failed),
            Err(DomainError::NotFound("order"))
        ));
    }

    #[test]
    fn deleting_an_order_removes_its_items() {
        let f = fixture();
        let (cart_id, _, _) = sample_cart(&f);
        let order = f.orders.place_order(cart_id, 7).expect("place order");

        let deleted = f.orders.delete_order(order.order.id).expect("delete");
        assert_eq!(deleted.lines.len(), 2);
        assert_eq!(deleted.total_order_price().to_string(), "25.00");

        let state = f.store.snapshot();
        assert!(state.orders.is_empty());
        assert!(state.order_items.is_empty());
        assert!(matches!(
            f.orders.delete_order(order.order.id),
            Err(DomainError::NotFound("order"))
        ));
    }
}
