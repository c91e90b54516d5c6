//! Trip API Module
//!
//! Public read access to the trip catalog. Publishing trips is an
//! administrator operation.

mod handler;

use axum::{
    Router,
    routing::get,
};

use crate::core::ServerState;

/// Trip router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/trips", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Trip catalog with seat availability
        .route("/", get(handler::list).post(handler::create))
        // Trip detail (occupied seats included)
        .route("/{id}", get(handler::get_by_id))
}
