pub mod product;

use storefront_auth_types::token::{TokenInfo, validate_access_token};

use crate::error::CatalogServiceError;

/// Validate a bearer token against the service secret.
pub(crate) fn authenticate(token: &str, secret: &str) -> Result<TokenInfo, CatalogServiceError> {
    validate_access_token(token, secret).map_err(|_| CatalogServiceError::Unauthenticated)
}
