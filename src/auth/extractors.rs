use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{jwt::{Claims, JwtKeys}, session::token_from_headers};
use crate::error::AppError;

/// Verified session claims. Rejects with 401 when the session credential is
/// missing or does not verify.
pub struct AuthSession(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            warn!("no session credential");
            return Err(AppError::MissingSession);
        };

        let keys = JwtKeys::from_ref(state);
        match keys.verify(&token) {
            Ok(claims) => Ok(AuthSession(claims)),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Err(AppError::InvalidSession)
            }
        }
    }
}
