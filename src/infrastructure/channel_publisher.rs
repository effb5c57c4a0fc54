use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::domain::errors::DomainError;
use crate::domain::events::OrderCreated;
use crate::domain::ports::EventPublisher;

/// Events waiting for the notification worker before publishing starts failing.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Hands events to the in-process notification worker.
#[derive(Clone)]
pub struct ChannelEventPublisher {
    tx: Sender<OrderCreated>,
}

impl ChannelEventPublisher {
    pub fn new() -> (Self, Receiver<OrderCreated>) {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, Receiver<OrderCreated>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelEventPublisher {
    /// Never blocks: a full queue is reported as a delivery failure.
    fn publish(&self, event: &OrderCreated) -> Result<(), DomainError> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(event) => DomainError::Delivery(format!(
                "notification queue is full, dropped order {}",
                event.order_id()
            )),
            TrySendError::Closed(_) => {
                DomainError::Delivery("notification worker has stopped".to_string())
            }
        })
    }
}

/// Sends an order confirmation for every event until all publishers are
/// dropped. Returns how many confirmations went out.
pub async fn run_notifier(mut rx: Receiver<OrderCreated>) -> usize {
    let mut sent = 0;
    while let Some(event) = rx.recv().await {
        let view = &event.order;
        log::info!("order {} has been successfully created", view.order.id);
        log::info!(
            "sending confirmation to {} (customer {}): {} item(s), total {}",
            view.customer.full_name(),
            view.customer.id,
            view.lines.len(),
            view.total_order_price()
        );
        sent += 1;
    }
    log::info!("notification worker stopped after {} confirmation(s)", sent);
    sent
}
