use chrono::{DateTime, Utc};
use uuid::Uuid;

use storefront_domain::user::UserRole;

/// User account as the credential state machine sees it.
///
/// Lifecycle: created unconfirmed+active at registration, confirmed once the
/// one-shot confirmation token is consumed, then deactivated/reactivated any
/// number of times by an administrator, and finally deleted (terminal).
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_email_confirmed: bool,
    /// One-shot token pending email confirmation; cleared on use.
    pub email_confirmation_token: Option<String>,
    /// One-shot token pending password reset; cleared on use.
    pub password_reset_token: Option<String>,
    pub password_reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A reset token is only valid while present AND strictly before expiry
    /// (`now == expiry` counts as expired).
    pub fn reset_token_valid(&self, now: DateTime<Utc>) -> bool {
        self.password_reset_token.is_some()
            && self.password_reset_expires_at.is_some_and(|exp| now < exp)
    }
}

/// Access-token lifetime in seconds.
pub const ACCESS_TOKEN_TTL_SECS: u64 = 3600;

/// Password-reset token lifetime in seconds.
pub const RESET_TOKEN_TTL_SECS: i64 = 3600;

/// Length of opaque single-use tokens (confirmation, reset).
pub const OPAQUE_TOKEN_LEN: usize = 48;
