use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Product listing scoped to an owning user.
///
/// A soft-deleted product (`is_deleted = true`) is excluded from all default
/// reads but remains recoverable until hard-deleted. Visibility mirrors the
/// owner's *current* account state, lagging it by message-delivery latency.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    /// Opaque id of the owning user; no referential enforcement — the two
    /// services do not share a database.
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    /// Non-negative.
    pub price: Decimal,
    pub is_available: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Search filter over the default (non-deleted) product set.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring over name and description.
    pub term: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub owner_id: Option<Uuid>,
}
