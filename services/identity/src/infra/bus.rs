use storefront_bus::MessagePublisher;
use storefront_events::UserLifecycleEvent;

use crate::domain::repository::EventPublisher;
use crate::error::IdentityServiceError;

/// Adapter from the domain publisher port to the message transport.
#[derive(Clone)]
pub struct BusEventPublisher<P: MessagePublisher> {
    pub bus: P,
}

impl<P: MessagePublisher> EventPublisher for BusEventPublisher<P> {
    async fn publish(&self, event: &UserLifecycleEvent) -> Result<(), IdentityServiceError> {
        self.bus
            .publish(event.routing_key(), &event.encode())
            .await
            .map_err(|e| IdentityServiceError::PublishFailed(e.to_string()))
    }
}
