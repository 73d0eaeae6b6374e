pub mod auth;
pub mod users;

use storefront_auth_types::token::{TokenInfo, validate_access_token};
use storefront_domain::user::UserRole;

use crate::error::IdentityServiceError;

/// Validate a bearer token against the service secret.
pub(crate) fn authenticate(token: &str, secret: &str) -> Result<TokenInfo, IdentityServiceError> {
    validate_access_token(token, secret).map_err(|_| IdentityServiceError::Unauthenticated)
}

/// Administrator gate, exhaustive over the role set.
pub(crate) fn require_admin(info: &TokenInfo) -> Result<(), IdentityServiceError> {
    match info.role {
        UserRole::Admin => Ok(()),
        UserRole::User => Err(IdentityServiceError::Forbidden),
    }
}
