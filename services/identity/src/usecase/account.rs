//! Administrative account operations.
//!
//! Activate, deactivate and delete each mutate local state first and then
//! publish the matching lifecycle event before returning. A publish failure
//! surfaces to the caller as `PublishFailed` — the state change stands, but
//! the caller (and the audit log) learns that visibility propagation is
//! delayed or lost.

use chrono::Utc;
use uuid::Uuid;

use storefront_domain::user::UserRole;
use storefront_events::{UserActivated, UserDeactivated, UserDeleted, UserLifecycleEvent};

use crate::domain::repository::{EventPublisher, UserRepository};
use crate::domain::types::User;
use crate::error::IdentityServiceError;

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<User>, IdentityServiceError> {
        self.users.list().await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, IdentityServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityServiceError::UserNotFound)
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

pub struct UpdateUserUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UpdateUserUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateUserInput,
    ) -> Result<User, IdentityServiceError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(IdentityServiceError::UserNotFound);
        };

        if let Some(email) = input.email {
            // Email changes re-check uniqueness against other accounts.
            if email != user.email {
                if let Some(other) = self.users.find_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(IdentityServiceError::AlreadyExists);
                    }
                }
                user.email = email;
            }
        }
        if let Some(full_name) = input.full_name {
            user.full_name = full_name;
        }
        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        Ok(user)
    }
}

// ── UpdateRole ───────────────────────────────────────────────────────────────

pub struct UpdateRoleUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> UpdateRoleUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<(), IdentityServiceError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(IdentityServiceError::UserNotFound);
        };
        user.role = role;
        user.updated_at = Utc::now();
        self.users.update(&user).await
    }
}

// ── ActivateUser ─────────────────────────────────────────────────────────────

pub struct ActivateUserUseCase<R, P>
where
    R: UserRepository,
    P: EventPublisher,
{
    pub users: R,
    pub events: P,
}

impl<R, P> ActivateUserUseCase<R, P>
where
    R: UserRepository,
    P: EventPublisher,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<(), IdentityServiceError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(IdentityServiceError::UserNotFound);
        };
        user.is_active = true;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        self.events
            .publish(&UserLifecycleEvent::Activated(UserActivated {
                user_id: user.id,
                email: user.email.clone(),
                activated_at: Utc::now(),
            }))
            .await
    }
}

// ── DeactivateUser ───────────────────────────────────────────────────────────

pub struct DeactivateUserUseCase<R, P>
where
    R: UserRepository,
    P: EventPublisher,
{
    pub users: R,
    pub events: P,
}

impl<R, P> DeactivateUserUseCase<R, P>
where
    R: UserRepository,
    P: EventPublisher,
{
    pub async fn execute(&self, user_id: Uuid) -> Result<(), IdentityServiceError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(IdentityServiceError::UserNotFound);
        };
        user.is_active = false;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        self.events
            .publish(&UserLifecycleEvent::Deactivated(UserDeactivated {
                user_id: user.id,
                email: user.email.clone(),
                deactivated_at: Utc::now(),
            }))
            .await
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R, P>
where
    R: UserRepository,
    P: EventPublisher,
{
    pub users: R,
    pub events: P,
}

impl<R, P> DeleteUserUseCase<R, P>
where
    R: UserRepository,
    P: EventPublisher,
{
    /// Terminal: removes the record and announces it. The id is never reused.
    pub async fn execute(&self, user_id: Uuid) -> Result<(), IdentityServiceError> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Err(IdentityServiceError::UserNotFound);
        };
        self.users.delete(user.id).await?;

        self.events
            .publish(&UserLifecycleEvent::Deleted(UserDeleted {
                user_id: user.id,
                email: Some(user.email.clone()),
                deleted_at: Utc::now(),
            }))
            .await
    }
}
