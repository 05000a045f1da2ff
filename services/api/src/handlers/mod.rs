use axum::extract::{FromRef, FromRequest, FromRequestParts};
use axum::http::request::Parts;

use repair_auth_types::identity::BearerSession;
use repair_auth_types::token::{SessionIdentity, SessionIssuer};

use crate::error::ApiServiceError;

pub mod auth;
pub mod feedback;
pub mod health;
pub mod repair;

/// `axum::Json` whose rejection renders as an `INVALID_INPUT` error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiServiceError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with the same rejection mapping as [`AppJson`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiServiceError))]
pub struct AppQuery<T>(pub T);

/// Authenticated caller. Wraps [`BearerSession`] so that a missing or invalid
/// credential renders as an `INVALID_TOKEN` error body.
#[derive(Debug, Clone)]
pub struct Caller(pub SessionIdentity);

impl<S> FromRequestParts<S> for Caller
where
    SessionIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerSession(identity) = BearerSession::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiServiceError::InvalidToken)?;
        Ok(Self(identity))
    }
}
