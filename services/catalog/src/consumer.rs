//! Long-lived event consumer.
//!
//! One worker owns one message source for its task's lifetime. Messages are
//! decoded once into the closed event union and applied synchronously, one
//! at a time, in delivery order — no parallel fan-out, so an
//! activate/deactivate pair for the same user cannot be applied out of the
//! order it was received in.

use tokio::sync::watch;

use storefront_bus::{Delivery, MessageSource};
use storefront_events::UserLifecycleEvent;

use crate::domain::repository::ProductRepository;
use crate::error::CatalogServiceError;
use crate::usecase::sync::VisibilitySync;

/// Attempts before a failing message is dropped instead of requeued.
///
/// Unbounded nack-and-requeue would let one malformed payload poison the
/// queue forever; after this many deliveries the message is acknowledged
/// away and logged for operator remediation.
pub const DEFAULT_MAX_DELIVERIES: u64 = 5;

pub struct EventConsumer<S, R>
where
    S: MessageSource,
    R: ProductRepository,
{
    source: S,
    sync: VisibilitySync<R>,
    max_deliveries: u64,
}

impl<S, R> EventConsumer<S, R>
where
    S: MessageSource,
    R: ProductRepository,
{
    pub fn new(source: S, sync: VisibilitySync<R>) -> Self {
        Self {
            source,
            sync,
            max_deliveries: DEFAULT_MAX_DELIVERIES,
        }
    }

    pub fn with_max_deliveries(mut self, max_deliveries: u64) -> Self {
        self.max_deliveries = max_deliveries;
        self
    }

    /// Consume until the shutdown signal flips.
    ///
    /// Cancellation stops intake before the next receive; an in-flight
    /// handler always finishes and settles its ack first. Dropping the
    /// source on exit releases the transport connection, returning any
    /// unacknowledged messages to the queue.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("event consumer started");
        loop {
            let delivery = tokio::select! {
                _ = shutdown.changed() => break,
                next = self.source.next() => match next {
                    Ok(delivery) => delivery,
                    Err(e) => {
                        tracing::error!(error = %e, "consume failed, retrying");
                        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                        continue;
                    }
                },
            };
            self.handle(delivery).await;
        }
        tracing::info!("event consumer stopped");
    }

    async fn handle(&mut self, delivery: Delivery) {
        match self.apply(&delivery).await {
            Ok(()) => {
                if let Err(e) = self.source.ack(&delivery).await {
                    tracing::error!(
                        routing_key = %delivery.routing_key,
                        entry_id = %delivery.entry_id,
                        error = %e,
                        "ack failed; message will be redelivered"
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    routing_key = %delivery.routing_key,
                    entry_id = %delivery.entry_id,
                    delivery_count = delivery.delivery_count,
                    error = %e,
                    "event handling failed"
                );
                let settle = if delivery.delivery_count >= self.max_deliveries {
                    tracing::error!(
                        routing_key = %delivery.routing_key,
                        entry_id = %delivery.entry_id,
                        "dropping poison message after {} deliveries",
                        delivery.delivery_count
                    );
                    self.source.ack(&delivery).await
                } else {
                    self.source.nack_requeue(&delivery).await
                };
                if let Err(e) = settle {
                    tracing::error!(entry_id = %delivery.entry_id, error = %e, "settle failed");
                }
            }
        }
    }

    async fn apply(&self, delivery: &Delivery) -> Result<(), CatalogServiceError> {
        let event = UserLifecycleEvent::decode(&delivery.routing_key, &delivery.payload)
            .map_err(|e| CatalogServiceError::Internal(anyhow::anyhow!(e)))?;

        match event {
            UserLifecycleEvent::Activated(e) => self.sync.on_user_activated(e.user_id).await,
            UserLifecycleEvent::Deactivated(e) => {
                self.sync.on_user_deactivated(e.user_id).await
            }
            UserLifecycleEvent::Deleted(e) => self.sync.on_user_deleted(e.user_id).await,
        }
    }
}

/// Build a consumer from its parts; exposed for wiring in `main` and tests.
pub fn lifecycle_consumer<S, R>(source: S, products: R) -> EventConsumer<S, R>
where
    S: MessageSource,
    R: ProductRepository,
{
    EventConsumer::new(source, VisibilitySync { products })
}
