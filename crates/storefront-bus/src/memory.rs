//! In-process topic exchange.
//!
//! Same ports as the Redis transport, backed by channels. Used by tests and
//! broker-less local runs. Redelivery via `nack_requeue` increments the
//! delivery count exactly like the stream transport does, so consumer-side
//! retry logic can be exercised without a broker.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::error::BusError;
use crate::{Delivery, MessagePublisher, MessageSource};

struct QueueBinding {
    routing_keys: Vec<String>,
    tx: mpsc::UnboundedSender<Delivery>,
}

struct ExchangeInner {
    queues: Vec<QueueBinding>,
}

/// An in-memory topic exchange; clone handles freely.
#[derive(Clone)]
pub struct MemoryExchange {
    inner: Arc<Mutex<ExchangeInner>>,
    next_entry: Arc<AtomicU64>,
}

impl Default for MemoryExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryExchange {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ExchangeInner { queues: Vec::new() })),
            next_entry: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Publisher handle onto this exchange.
    pub fn publisher(&self) -> MemoryPublisher {
        MemoryPublisher {
            exchange: self.clone(),
        }
    }

    /// Declare a queue bound to the given routing keys.
    pub fn bind(&self, routing_keys: &[&str]) -> MemoryQueue {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().queues.push(QueueBinding {
            routing_keys: routing_keys.iter().map(|k| (*k).to_owned()).collect(),
            tx: tx.clone(),
        });
        MemoryQueue { rx, requeue: tx }
    }

    fn route(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError> {
        let entry_id = self.next_entry.fetch_add(1, Ordering::Relaxed).to_string();
        let inner = self.inner.lock().unwrap();
        for queue in &inner.queues {
            if queue.routing_keys.iter().any(|k| k == routing_key) {
                queue
                    .tx
                    .send(Delivery {
                        routing_key: routing_key.to_owned(),
                        payload: payload.to_vec(),
                        entry_id: entry_id.clone(),
                        delivery_count: 1,
                    })
                    .map_err(|_| BusError::Closed)?;
            }
        }
        Ok(())
    }
}

/// Publisher side of [`MemoryExchange`].
#[derive(Clone)]
pub struct MemoryPublisher {
    exchange: MemoryExchange,
}

impl MessagePublisher for MemoryPublisher {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError> {
        self.exchange.route(routing_key, payload)
    }
}

/// Consumer side of [`MemoryExchange`].
pub struct MemoryQueue {
    rx: mpsc::UnboundedReceiver<Delivery>,
    requeue: mpsc::UnboundedSender<Delivery>,
}

impl MessageSource for MemoryQueue {
    async fn next(&mut self) -> Result<Delivery, BusError> {
        self.rx.recv().await.ok_or(BusError::Closed)
    }

    async fn ack(&mut self, _delivery: &Delivery) -> Result<(), BusError> {
        Ok(())
    }

    async fn nack_requeue(&mut self, delivery: &Delivery) -> Result<(), BusError> {
        let mut redelivery = delivery.clone();
        redelivery.delivery_count += 1;
        self.requeue.send(redelivery).map_err(|_| BusError::Closed)
    }
}
