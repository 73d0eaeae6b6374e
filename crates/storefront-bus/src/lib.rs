//! Message transport for cross-service lifecycle events.
//!
//! A topic-exchange abstraction with at-least-once delivery. Publishers send
//! a payload under a routing key; consumers bind a queue to a set of keys and
//! acknowledge each delivery by hand. The production transport maps the
//! exchange onto Redis Streams with consumer groups ([`stream`]); tests and
//! broker-less runs use the in-process exchange in [`memory`].

#![allow(async_fn_in_trait)]

pub mod connection;
pub mod error;
pub mod memory;
pub mod stream;

pub use connection::{BusConnection, ConnectionState, ReconnectPolicy};
pub use error::BusError;
pub use memory::{MemoryExchange, MemoryPublisher, MemoryQueue};
pub use stream::{StreamPublisher, StreamSubscriber};

/// Content type stamped on every published message.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One message handed to a consumer.
///
/// `delivery_count` starts at 1 and grows by one on every redelivery, letting
/// consumers bound retries for poison messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub routing_key: String,
    pub payload: Vec<u8>,
    /// Transport-assigned id, used for acknowledgement and log correlation.
    pub entry_id: String,
    pub delivery_count: u64,
}

/// Publisher side of the exchange. Messages are durable: the transport keeps
/// them until every bound queue has acknowledged.
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError>;
}

/// Consumer side of the exchange: pull-based with manual acknowledgement.
///
/// `ack` removes the delivery from the queue; `nack_requeue` leaves it for
/// redelivery. A delivery that is neither acked nor nacked (consumer crash)
/// is redelivered once the transport considers it abandoned.
pub trait MessageSource: Send {
    async fn next(&mut self) -> Result<Delivery, BusError>;
    async fn ack(&mut self, delivery: &Delivery) -> Result<(), BusError>;
    async fn nack_requeue(&mut self, delivery: &Delivery) -> Result<(), BusError>;
}
