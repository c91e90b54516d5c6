//! Payment API Module
//!
//! Payment initiation and the two confirmation paths: client-side verify
//! and gateway webhook. Both converge on the same idempotent transition.

mod handler;

use axum::{
    Router,
    routing::post,
};

use crate::core::ServerState;

/// Payment router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Start a payment for a pending reservation (owner or admin)
        .route("/initiate", post(handler::initiate))
        // Client-side confirmation poll - public route
        .route("/verify", post(handler::verify))
        // Gateway callback - public route, shared-secret protected
        .route("/webhook", post(handler::webhook))
}
