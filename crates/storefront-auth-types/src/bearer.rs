//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

/// Raw bearer token pulled from the `Authorization` header.
///
/// Returns 401 if the header is absent or not of the form `Bearer <token>`.
/// Signature/expiry validation is done by handlers against the service
/// secret after extraction.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_owned());

        async move {
            let token = token.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self(token))
        }
    }
}
