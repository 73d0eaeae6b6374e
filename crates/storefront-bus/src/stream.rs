//! Redis Streams realization of the topic exchange.
//!
//! Each routing key maps to one stream named `"{exchange}.{routing_key}"`.
//! A consumer group per logical queue gives at-least-once delivery: entries
//! stay in the group's pending list until XACKed, and entries pending longer
//! than `claim_min_idle` are reclaimed (redelivered) by whoever reads next.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use deadpool_redis::redis::{AsyncCommands, Value, cmd};

use crate::connection::BusConnection;
use crate::error::BusError;
use crate::{CONTENT_TYPE_JSON, Delivery, MessagePublisher, MessageSource};

/// (entry id, fields) pairs as returned by XRANGE/XREADGROUP/XCLAIM.
type StreamEntries = Vec<(String, HashMap<String, Vec<u8>>)>;
/// Per-stream batches as returned by XREADGROUP over several keys.
type ReadReply = Vec<(String, StreamEntries)>;
/// (entry id, consumer, idle ms, delivery count) as returned by XPENDING.
type PendingEntries = Vec<(String, String, u64, u64)>;

fn stream_key(exchange: &str, routing_key: &str) -> String {
    format!("{exchange}.{routing_key}")
}

// ── Publisher ────────────────────────────────────────────────────────────────

/// Durable publisher for one exchange.
///
/// A failed publish reconnects and retries exactly once; the second failure
/// surfaces to the caller so a lost event is never silently dropped.
#[derive(Clone)]
pub struct StreamPublisher {
    conn: BusConnection,
    exchange: String,
}

impl StreamPublisher {
    pub fn new(conn: BusConnection, exchange: impl Into<String>) -> Self {
        Self {
            conn,
            exchange: exchange.into(),
        }
    }

    async fn try_publish(&self, routing_key: &str, payload: &[u8]) -> Result<String, String> {
        let mut conn = self.conn.acquire().await.map_err(|e| e.to_string())?;
        let key = stream_key(&self.exchange, routing_key);
        let entry_id: String = conn
            .xadd(
                &key,
                "*",
                &[
                    ("content-type", CONTENT_TYPE_JSON.as_bytes()),
                    ("payload", payload),
                ],
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok(entry_id)
    }
}

impl MessagePublisher for StreamPublisher {
    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<(), BusError> {
        match self.try_publish(routing_key, payload).await {
            Ok(entry_id) => {
                tracing::info!(routing_key, %entry_id, "event published");
                return Ok(());
            }
            Err(reason) => {
                tracing::warn!(routing_key, error = %reason, "publish failed, reconnecting once");
                self.conn.mark_disconnected();
            }
        }

        match self.try_publish(routing_key, payload).await {
            Ok(entry_id) => {
                tracing::info!(routing_key, %entry_id, "event published after reconnect");
                Ok(())
            }
            Err(reason) => {
                tracing::error!(routing_key, error = %reason, "publish failed after reconnect");
                Err(BusError::Publish {
                    routing_key: routing_key.to_owned(),
                    reason,
                })
            }
        }
    }
}

// ── Subscriber ───────────────────────────────────────────────────────────────

struct Binding {
    stream_key: String,
    routing_key: String,
}

/// One queue bound to a set of routing keys, consumed with manual acks.
///
/// The subscriber owns its connection handle for the lifetime of the worker
/// task that drives it; dropping it releases the connection and leaves
/// unacknowledged entries pending for the next consumer.
pub struct StreamSubscriber {
    conn: BusConnection,
    group: String,
    consumer: String,
    exchange: String,
    bindings: Vec<Binding>,
    buffer: VecDeque<Delivery>,
    batch: usize,
    block: Duration,
    claim_min_idle: Duration,
}

impl StreamSubscriber {
    /// Declare the consumer group on every bound stream (idempotent) and
    /// return a subscriber ready to consume.
    pub async fn bind(
        conn: BusConnection,
        exchange: impl Into<String>,
        group: impl Into<String>,
        consumer: impl Into<String>,
        routing_keys: &[&str],
    ) -> Result<Self, BusError> {
        let exchange = exchange.into();
        let group = group.into();

        let bindings: Vec<Binding> = routing_keys
            .iter()
            .map(|rk| Binding {
                stream_key: stream_key(&exchange, rk),
                routing_key: (*rk).to_owned(),
            })
            .collect();

        let mut redis = conn.acquire().await?;
        for binding in &bindings {
            let created: Result<Value, _> = cmd("XGROUP")
                .arg("CREATE")
                .arg(&binding.stream_key)
                .arg(&group)
                .arg("0")
                .arg("MKSTREAM")
                .query_async(&mut redis)
                .await;
            match created {
                Ok(_) => {}
                // The group survives restarts; re-declaring is expected.
                Err(e) if e.to_string().contains("BUSYGROUP") => {}
                Err(e) => return Err(BusError::Consume(e.to_string())),
            }
        }
        drop(redis);

        Ok(Self {
            conn,
            group,
            consumer: consumer.into(),
            exchange,
            bindings,
            buffer: VecDeque::new(),
            batch: 16,
            block: Duration::from_secs(5),
            claim_min_idle: Duration::from_secs(30),
        })
    }

    fn routing_key_for(&self, stream: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.stream_key == stream)
            .map(|b| b.routing_key.as_str())
    }

    /// Reclaim entries another (or a previous) consumer read but never acked.
    /// Their delivery count grows with each claim, feeding bounded retry.
    async fn claim_stale(&mut self) -> Result<(), BusError> {
        let mut conn = self.conn.acquire().await?;
        let min_idle_ms = self.claim_min_idle.as_millis() as u64;

        for i in 0..self.bindings.len() {
            let (key, routing_key) = {
                let b = &self.bindings[i];
                (b.stream_key.clone(), b.routing_key.clone())
            };
            let pending: PendingEntries = cmd("XPENDING")
                .arg(&key)
                .arg(&self.group)
                .arg("IDLE")
                .arg(min_idle_ms)
                .arg("-")
                .arg("+")
                .arg(self.batch)
                .query_async(&mut conn)
                .await
                .map_err(|e| self.consume_err(e))?;
            if pending.is_empty() {
                continue;
            }

            let counts: HashMap<String, u64> = pending
                .iter()
                .map(|(id, _, _, count)| (id.clone(), *count))
                .collect();
            let mut claim = cmd("XCLAIM");
            claim
                .arg(&key)
                .arg(&self.group)
                .arg(&self.consumer)
                .arg(min_idle_ms);
            for (id, _, _, _) in &pending {
                claim.arg(id);
            }
            let claimed: StreamEntries = claim
                .query_async(&mut conn)
                .await
                .map_err(|e| self.consume_err(e))?;

            for (entry_id, fields) in claimed {
                if let Some(payload) = fields.get("payload") {
                    let prior = counts.get(&entry_id).copied().unwrap_or(1);
                    self.buffer.push_back(Delivery {
                        routing_key: routing_key.clone(),
                        payload: payload.clone(),
                        entry_id,
                        delivery_count: prior + 1,
                    });
                } else {
                    tracing::warn!(%entry_id, stream = %key, "claimed entry without payload field");
                }
            }
        }
        Ok(())
    }

    /// Block for fresh entries across every bound stream.
    async fn read_fresh(&mut self) -> Result<(), BusError> {
        let mut conn = self.conn.acquire().await?;

        let mut read = cmd("XREADGROUP");
        read.arg("GROUP")
            .arg(&self.group)
            .arg(&self.consumer)
            .arg("COUNT")
            .arg(self.batch)
            .arg("BLOCK")
            .arg(self.block.as_millis() as u64)
            .arg("STREAMS");
        for binding in &self.bindings {
            read.arg(&binding.stream_key);
        }
        for _ in &self.bindings {
            read.arg(">");
        }

        let reply: Option<ReadReply> = read
            .query_async(&mut conn)
            .await
            .map_err(|e| self.consume_err(e))?;

        for (stream, entries) in reply.unwrap_or_default() {
            let Some(routing_key) = self.routing_key_for(&stream).map(str::to_owned) else {
                continue;
            };
            for (entry_id, fields) in entries {
                if let Some(payload) = fields.get("payload") {
                    self.buffer.push_back(Delivery {
                        routing_key: routing_key.clone(),
                        payload: payload.clone(),
                        entry_id,
                        delivery_count: 1,
                    });
                } else {
                    tracing::warn!(%entry_id, %stream, "entry without payload field");
                }
            }
        }
        Ok(())
    }

    fn consume_err(&self, e: deadpool_redis::redis::RedisError) -> BusError {
        self.conn.mark_disconnected();
        BusError::Consume(e.to_string())
    }
}

impl MessageSource for StreamSubscriber {
    async fn next(&mut self) -> Result<Delivery, BusError> {
        loop {
            if let Some(delivery) = self.buffer.pop_front() {
                return Ok(delivery);
            }
            self.claim_stale().await?;
            if !self.buffer.is_empty() {
                continue;
            }
            self.read_fresh().await?;
        }
    }

    async fn ack(&mut self, delivery: &Delivery) -> Result<(), BusError> {
        let key = stream_key(&self.exchange, &delivery.routing_key);
        let mut conn = self.conn.acquire().await?;
        let (): () = conn
            .xack(&key, &self.group, &[&delivery.entry_id])
            .await
            .map_err(|e| self.consume_err(e))?;
        Ok(())
    }

    async fn nack_requeue(&mut self, delivery: &Delivery) -> Result<(), BusError> {
        // No XACK: the entry stays in the pending list and is reclaimed
        // (delivery count incremented) after `claim_min_idle`.
        tracing::debug!(
            routing_key = %delivery.routing_key,
            entry_id = %delivery.entry_id,
            "delivery left pending for redelivery"
        );
        Ok(())
    }
}
