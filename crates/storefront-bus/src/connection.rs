//! Explicit connection manager over the Redis pool.
//!
//! Every acquisition goes through a small state machine instead of implicit
//! lazy reconnection at call sites: `Disconnected → Connecting → Ready`, with
//! `Faulted` once the reconnect budget is exhausted. A later acquire attempt
//! leaves `Faulted` again, so a recovered broker heals the connection without
//! a restart.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use deadpool_redis::{Connection, Pool};

use crate::error::BusError;

/// Where the connection manager currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
    Faulted,
}

/// Bounded reconnect-with-backoff policy.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(100),
        }
    }
}

impl ReconnectPolicy {
    /// Exponential backoff for the given zero-based attempt.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt)
    }
}

/// A process-wide handle to the transport, one per role (publishers and
/// consumers never share one — they each own their connection).
#[derive(Clone)]
pub struct BusConnection {
    pool: Pool,
    state: Arc<Mutex<ConnectionState>>,
    policy: ReconnectPolicy,
}

impl BusConnection {
    pub fn new(pool: Pool, policy: ReconnectPolicy) -> Self {
        Self {
            pool,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.lock().unwrap() = next;
    }

    /// Mark the connection lost so the next acquire goes through the
    /// reconnect path. Called by users after an I/O error.
    pub fn mark_disconnected(&self) {
        self.set_state(ConnectionState::Disconnected);
    }

    /// Get a live connection, reconnecting with backoff if needed.
    ///
    /// Transitions to `Faulted` once `max_attempts` acquisitions in a row
    /// fail, and returns [`BusError::Faulted`].
    pub async fn acquire(&self) -> Result<Connection, BusError> {
        self.set_state(ConnectionState::Connecting);

        let mut last_err = String::new();
        for attempt in 0..self.policy.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.policy.backoff(attempt - 1)).await;
            }
            match self.pool.get().await {
                Ok(conn) => {
                    self.set_state(ConnectionState::Ready);
                    return Ok(conn);
                }
                Err(e) => {
                    last_err = e.to_string();
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %last_err,
                        "transport connect attempt failed"
                    );
                }
            }
        }

        self.set_state(ConnectionState::Faulted);
        tracing::error!(
            attempts = self.policy.max_attempts,
            error = %last_err,
            "transport faulted"
        );
        Err(BusError::Faulted {
            attempts: self.policy.max_attempts,
        })
    }
}
