#![allow(async_fn_in_trait)]

use uuid::Uuid;

use storefront_events::UserLifecycleEvent;

use crate::domain::types::User;
use crate::error::IdentityServiceError;

/// Repository for user accounts and their credential state.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityServiceError>;
    async fn find_by_confirmation_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, IdentityServiceError>;
    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, IdentityServiceError>;
    async fn list(&self) -> Result<Vec<User>, IdentityServiceError>;
    async fn create(&self, user: &User) -> Result<(), IdentityServiceError>;
    /// Full-row write of every mutable field.
    async fn update(&self, user: &User) -> Result<(), IdentityServiceError>;
    async fn delete(&self, id: Uuid) -> Result<(), IdentityServiceError>;
}

/// Port for publishing lifecycle events onto the topic exchange.
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &UserLifecycleEvent) -> Result<(), IdentityServiceError>;
}

/// Port for outbound mail. All call sites are fire-and-forget: failures are
/// logged by the caller, never propagated to the user.
pub trait Mailer: Send + Sync {
    async fn send_confirmation(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), IdentityServiceError>;
    async fn send_welcome(&self, email: &str, name: &str) -> Result<(), IdentityServiceError>;
    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), IdentityServiceError>;
}
