pub mod channel_publisher;
pub mod models;
pub mod outbox_publisher;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
