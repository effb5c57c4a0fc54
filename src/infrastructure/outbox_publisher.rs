use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::events::OrderCreated;
use crate::domain::ports::EventPublisher;
use crate::schema::store_order_outbox;

use super::models::NewOutboxEventRow;

pub const AGGREGATE_TYPE: &str = "Order";

/// Writes events to `store_order_outbox` for Debezium to relay. The row goes
/// in on its own connection once the order itself has committed.
#[derive(Clone)]
pub struct OutboxEventPublisher {
    pool: DbPool,
}

impl OutboxEventPublisher {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl EventPublisher for OutboxEventPublisher {
    fn publish(&self, event: &OrderCreated) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        // Debezium's EventRouter SMT derives the Kafka topic from `aggregate_type`.
        diesel::insert_into(store_order_outbox::table)
            .values(&NewOutboxEventRow {
                id: Uuid::new_v4(),
                aggregate_type: AGGREGATE_TYPE.to_string(),
                aggregate_id: event.order_id().to_string(),
                event_type: event.name().to_string(),
                payload: event.payload(),
            })
            .execute(&mut conn)?;

        log::debug!("queued {} for order {}", event.name(), event.order_id());
        Ok(())
    }
}
