//! User lifecycle events exchanged between the identity and catalog services.
//!
//! Events are transient wire-level messages, never persisted. The JSON field
//! names (`UserId`, `Email`, `ActivatedAt`, ...) are the canonical wire
//! format; timestamps serialize as ISO-8601 UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Routing key for [`UserActivated`].
pub const USER_ACTIVATED: &str = "user.activated";
/// Routing key for [`UserDeactivated`].
pub const USER_DEACTIVATED: &str = "user.deactivated";
/// Routing key for [`UserDeleted`].
pub const USER_DELETED: &str = "user.deleted";

/// All routing keys a lifecycle consumer binds.
pub const ROUTING_KEYS: [&str; 3] = [USER_ACTIVATED, USER_DEACTIVATED, USER_DELETED];

/// An administrator re-enabled the account; owned products become visible again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivated {
    #[serde(rename = "UserId")]
    pub user_id: Uuid,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "ActivatedAt")]
    pub activated_at: DateTime<Utc>,
}

/// An administrator disabled the account; owned products are soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDeactivated {
    #[serde(rename = "UserId")]
    pub user_id: Uuid,
    #[serde(rename = "Email", default)]
    pub email: String,
    #[serde(rename = "DeactivatedAt")]
    pub deactivated_at: DateTime<Utc>,
}

/// The account was removed for good; owned products are hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDeleted {
    #[serde(rename = "UserId")]
    pub user_id: Uuid,
    #[serde(
        rename = "Email",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(rename = "DeletedAt")]
    pub deleted_at: DateTime<Utc>,
}

/// Closed union of the user lifecycle events.
///
/// The variant is resolved once, from the routing key, at deserialization
/// time — handlers downstream match on the enum, never on key strings.
#[derive(Debug, Clone, PartialEq)]
pub enum UserLifecycleEvent {
    Activated(UserActivated),
    Deactivated(UserDeactivated),
    Deleted(UserDeleted),
}

/// Failure to turn a delivery back into a typed event.
#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    #[error("unknown routing key: {0}")]
    UnknownRoutingKey(String),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl UserLifecycleEvent {
    pub fn routing_key(&self) -> &'static str {
        match self {
            Self::Activated(_) => USER_ACTIVATED,
            Self::Deactivated(_) => USER_DEACTIVATED,
            Self::Deleted(_) => USER_DELETED,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Activated(e) => e.user_id,
            Self::Deactivated(e) => e.user_id,
            Self::Deleted(e) => e.user_id,
        }
    }

    /// Serialize to the canonical JSON wire format.
    pub fn encode(&self) -> Vec<u8> {
        let encoded = match self {
            Self::Activated(e) => serde_json::to_vec(e),
            Self::Deactivated(e) => serde_json::to_vec(e),
            Self::Deleted(e) => serde_json::to_vec(e),
        };
        // Serializing these plain structs cannot fail.
        encoded.expect("lifecycle event serializes")
    }

    /// Deserialize a delivery, resolving the variant from its routing key.
    pub fn decode(routing_key: &str, payload: &[u8]) -> Result<Self, EventDecodeError> {
        match routing_key {
            USER_ACTIVATED => Ok(Self::Activated(serde_json::from_slice(payload)?)),
            USER_DEACTIVATED => Ok(Self::Deactivated(serde_json::from_slice(payload)?)),
            USER_DELETED => Ok(Self::Deleted(serde_json::from_slice(payload)?)),
            other => Err(EventDecodeError::UnknownRoutingKey(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_with_canonical_field_names() {
        let event = UserLifecycleEvent::Deactivated(UserDeactivated {
            user_id: Uuid::nil(),
            email: "alice@example.com".into(),
            deactivated_at: "2026-01-05T10:00:00Z".parse().unwrap(),
        });
        let json: serde_json::Value = serde_json::from_slice(&event.encode()).unwrap();
        assert_eq!(json["UserId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["Email"], "alice@example.com");
        assert_eq!(json["DeactivatedAt"], "2026-01-05T10:00:00Z");
    }

    #[test]
    fn should_resolve_variant_from_routing_key() {
        let payload = br#"{"UserId":"7f4df30a-9e3c-4b47-9c2b-0c9f3a5b6d71","Email":"a@b.c","ActivatedAt":"2026-01-05T10:00:00Z"}"#;
        let event = UserLifecycleEvent::decode(USER_ACTIVATED, payload).unwrap();
        assert!(matches!(event, UserLifecycleEvent::Activated(_)));
        assert_eq!(event.routing_key(), USER_ACTIVATED);
    }

    #[test]
    fn should_decode_deleted_without_email() {
        let payload = br#"{"UserId":"7f4df30a-9e3c-4b47-9c2b-0c9f3a5b6d71","DeletedAt":"2026-01-05T10:00:00Z"}"#;
        let event = UserLifecycleEvent::decode(USER_DELETED, payload).unwrap();
        let UserLifecycleEvent::Deleted(deleted) = event else {
            panic!("expected Deleted variant");
        };
        assert_eq!(deleted.email, None);
    }

    #[test]
    fn should_reject_unknown_routing_key() {
        let err = UserLifecycleEvent::decode("user.renamed", b"{}").unwrap_err();
        assert!(matches!(err, EventDecodeError::UnknownRoutingKey(_)));
    }

    #[test]
    fn should_reject_malformed_payload() {
        let err = UserLifecycleEvent::decode(USER_DELETED, b"not json").unwrap_err();
        assert!(matches!(err, EventDecodeError::Payload(_)));
    }
}
