//! Access-token issuing and opaque single-use token generation.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use jsonwebtoken::{EncodingKey, Header, encode};
use rand::RngExt;
use std::time::{SystemTime, UNIX_EPOCH};

use storefront_auth_types::token::JwtClaims;

use crate::domain::types::{ACCESS_TOKEN_TTL_SECS, OPAQUE_TOKEN_LEN, User};
use crate::error::IdentityServiceError;

/// Charset for opaque tokens (alphanumeric, URL- and header-safe).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Issue a signed HS256 access token carrying id/email/name/role claims,
/// expiring in one hour. Returns the token and its expiry timestamp.
pub fn issue_access_token(
    user: &User,
    secret: &str,
) -> Result<(String, u64), IdentityServiceError> {
    let exp = now_secs() + ACCESS_TOKEN_TTL_SECS;
    let claims = JwtClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        role: user.role.as_str().to_owned(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| IdentityServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

/// Opaque refresh token: 32 random bytes, base64. Caller-managed; there is
/// no revocation list.
pub fn issue_refresh_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = std::array::from_fn(|_| rng.random_range(0..=u8::MAX));
    BASE64.encode(bytes)
}

/// Cryptographically random unguessable string, used identically for email
/// confirmation and password reset tokens (ThreadRng is a CSPRNG). The two
/// purposes are distinguished only by which column stores the token.
pub fn opaque_token() -> String {
    let mut rng = rand::rng();
    (0..OPAQUE_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
