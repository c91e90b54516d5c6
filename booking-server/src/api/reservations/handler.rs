//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::Reservation;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::booking::ReservationDetail;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// Request body for placing a seat hold
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub trip_id: i64,
    /// Seat label from the bus layout, e.g. "B3"
    #[validate(length(min = 1, max = 8))]
    pub selected_seat: String,
}

/// Place a hold on a seat for the current user
///
/// Responds 201 with the reservation and its trip attached for display.
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReservationDetail>>)> {
    payload.validate()?;

    let reservation =
        state
            .booking()
            .create_reservation(user.id, payload.trip_id, &payload.selected_seat)?;
    let detail = state.booking().get_reservation_detail(reservation.id)?;

    Ok((StatusCode::CREATED, ok_with_message(detail, "Seat reserved")))
}

/// Get reservation detail (owner or admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ReservationDetail>>> {
    let detail = state.booking().get_reservation_detail(id)?;
    if !user.can_access(detail.reservation.user_id) {
        return Err(AppError::forbidden("Not your reservation"));
    }
    Ok(ok(detail))
}

/// List all reservations of a user, newest first (owner or admin)
pub async fn list_for_user(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<ReservationDetail>>>> {
    if !user.can_access(user_id) {
        return Err(AppError::forbidden("Not your reservations"));
    }
    let reservations = state.booking().list_user_reservations(user_id)?;
    Ok(ok(reservations))
}

/// Cancel a reservation and free its seat (owner or admin)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Reservation>>> {
    // Ownership is immutable, so the check can run outside the
    // cancellation transaction.
    let detail = state.booking().get_reservation_detail(id)?;
    if !user.can_access(detail.reservation.user_id) {
        return Err(AppError::forbidden("Not your reservation"));
    }

    let reservation = state.booking().cancel_reservation(id)?;
    Ok(ok_with_message(reservation, "Reservation cancelled"))
}
