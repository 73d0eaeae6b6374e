#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use storefront_domain::pagination::PageRequest;

use crate::domain::types::{Product, ProductFilter};
use crate::error::CatalogServiceError;

/// Repository for product listings.
///
/// Default reads exclude soft-deleted rows; `include_deleted` widens a
/// lookup to the recoverable set. The three by-owner bulk operations are
/// each a single atomic statement against the local store — either every
/// row for that owner changes or none does.
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<Product>, CatalogServiceError>;

    async fn list(&self, page: PageRequest) -> Result<Vec<Product>, CatalogServiceError>;

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, CatalogServiceError>;

    /// Filtered page plus the total match count.
    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), CatalogServiceError>;

    async fn create(&self, product: &Product) -> Result<(), CatalogServiceError>;

    async fn update(&self, product: &Product) -> Result<(), CatalogServiceError>;

    async fn delete(&self, id: Uuid) -> Result<(), CatalogServiceError>;

    /// Soft-delete every non-deleted product of the owner. Returns rows changed.
    async fn soft_delete_by_owner(
        &self,
        owner_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, CatalogServiceError>;

    /// Restore every soft-deleted product of the owner. Returns rows changed.
    async fn restore_by_owner(&self, owner_id: Uuid) -> Result<u64, CatalogServiceError>;

    /// Permanently remove every product of the owner. Returns rows removed.
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, CatalogServiceError>;
}
