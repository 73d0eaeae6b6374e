/// Transport error variants.
///
/// Redis error details are flattened to strings so service crates stay free
/// of transport-library types.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("transport connect failed: {0}")]
    Connect(String),
    #[error("transport faulted after {attempts} connect attempts")]
    Faulted { attempts: u32 },
    #[error("publish failed on {routing_key}: {reason}")]
    Publish { routing_key: String, reason: String },
    #[error("consume failed: {0}")]
    Consume(String),
    #[error("transport closed")]
    Closed,
}
