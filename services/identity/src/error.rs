use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Identity service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum IdentityServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    AlreadyExists,
    // One message for unknown email and wrong password; the caller must not
    // learn which one it was.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account is deactivated")]
    Deactivated,
    #[error("email not confirmed")]
    EmailNotConfirmed,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("{0}")]
    Validation(String),
    #[error("event publish failed: {0}")]
    PublishFailed(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IdentityServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::AlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Deactivated => "ACCOUNT_DEACTIVATED",
            Self::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Validation(_) => "VALIDATION",
            Self::PublishFailed(_) => "EVENT_PUBLISH_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for IdentityServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::Deactivated | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::EmailNotConfirmed | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidToken | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PublishFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 5xx only — tower-http TraceLayer already records method/uri/status
        // for all requests. 4xx are expected client errors.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::PublishFailed(reason) => {
                // The local state change succeeded but propagation did not;
                // operators need this trail to remediate visibility drift.
                tracing::error!(error = %reason, kind = "EVENT_PUBLISH_FAILED", "event publish failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
