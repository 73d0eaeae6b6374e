//! JWT access-token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test))]
use serde::Serialize;
use uuid::Uuid;

use storefront_domain::user::UserRole;

/// Minimum HS256 signing-key length in bytes (256 bits).
///
/// Shorter keys are a fatal configuration error, checked once at service
/// startup rather than per request.
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// User identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub exp: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload shared by token creation (identity service) and
/// validation (every service).
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `email` | custom | account email |
/// | `name` | custom | display name |
/// | `role` | custom | `"User"` or `"Admin"` |
/// | `exp` | `exp` | seconds since epoch |
///
/// [`Deserialize`] is always available — all consumers validate tokens.
/// [`Serialize`] requires the **`USE_ONLY_IN_IDENTITY_SERVICE`** cargo
/// feature. Only the identity service enables it because it is the sole
/// token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(
    any(feature = "USE_ONLY_IN_IDENTITY_SERVICE", test),
    derive(Serialize)
)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: u64,
}

/// Reject signing keys under 256 bits. Call once at startup; a failure here
/// is a configuration error, not a runtime one.
pub fn validate_signing_key(secret: &str) -> Result<(), String> {
    if secret.len() < MIN_SIGNING_KEY_BYTES {
        return Err(format!(
            "signing key is {} bytes, need at least {} (256 bits)",
            secret.len(),
            MIN_SIGNING_KEY_BYTES
        ));
    }
    Ok(())
}

fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate an access token, returning the parsed identity.
///
/// Every service calls this on bearer-authenticated requests to extract the
/// caller's identity and role from the JWT.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    let role = UserRole::from_str(&claims.role).ok_or(AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        email: claims.email,
        name: claims.name,
        role,
        exp: claims.exp,
    })
}
