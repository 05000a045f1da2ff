use axum::http::StatusCode;

/// Handler for `GET /healthz`: liveness only, no dependencies touched.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map a dependency probe result to a readiness status.
///
/// Services wire their own `GET /readyz` handler around this.
pub fn readiness<E: std::fmt::Display>(probe: Result<(), E>) -> StatusCode {
    match probe {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
