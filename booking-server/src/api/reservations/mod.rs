//! Reservation API Module
//!
//! Seat holds and their lifecycle. All mutations go through BookingManager.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Reservation router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    // 所有预订接口都要求登录；属主检查在处理函数内
    Router::new()
        // Place a seat hold
        .route("/", post(handler::create))
        // Reservation detail (owner or admin)
        .route("/{id}", get(handler::get_by_id))
        // All reservations of a user (owner or admin)
        .route("/user/{user_id}", get(handler::list_for_user))
        // Cancel a reservation (owner or admin)
        .route("/{id}/cancel", post(handler::cancel))
}
