//! Shared service plumbing: tracing init, health endpoints, request-id layer.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
