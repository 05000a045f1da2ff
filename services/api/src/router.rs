use axum::{
    Router,
    routing::{get, post, put},
};
use tower::ServiceBuilder;

use repair_core::health::healthz;
use repair_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    auth::{login, register, reset_password, send_verification_code, verify_email},
    feedback::{list_feedback, submit_feedback},
    health::readyz,
    repair::{list_repair_requests, submit_repair_request, update_repair_request},
};
use crate::state::AppState;

/// Application routes, served both at the root and under `/api`.
fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/register", post(register))
        .route("/verify_email", post(verify_email))
        .route("/login", post(login))
        .route("/send_verification_code", post(send_verification_code))
        .route("/reset_password", post(reset_password))
        // Repair requests
        .route("/repair_requests", post(submit_repair_request))
        .route("/admin/repair_requests", get(list_repair_requests))
        .route("/admin/repair_requests/{id}", put(update_repair_request))
        // Feedback
        .route("/feedback", post(submit_feedback))
        .route("/feedback/{repair_id}", get(list_feedback))
}

pub fn build_router(state: AppState) -> Router {
    let routes = api_routes();
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(routes.clone())
        .nest("/api", routes)
        // The request id is set before the trace span opens.
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
