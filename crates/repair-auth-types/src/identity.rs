//! `Authorization: Bearer` session extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;

use crate::token::{SessionIdentity, SessionIssuer};

/// Identity of the caller, taken from a validated bearer credential.
///
/// Returns 401 if the header is absent, not a Bearer credential, or fails
/// validation. Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct BearerSession(pub SessionIdentity);

impl<S> FromRequestParts<S> for BearerSession
where
    SessionIssuer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Validate synchronously and return a 'static future so `parts` is not
    // captured across the await point.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let issuer = SessionIssuer::from_ref(state);
        let result = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(StatusCode::UNAUTHORIZED)
            .and_then(|Authorization(bearer)| {
                issuer.validate(bearer.token()).map_err(|e| {
                    tracing::debug!(error = %e, "rejected bearer credential");
                    StatusCode::UNAUTHORIZED
                })
            });

        async move { result.map(Self) }
    }
}
