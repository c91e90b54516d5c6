//! Trip API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::ApiResponse;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::booking::{TripDetail, TripDraft};
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// Request body for publishing a trip
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(length(min = 1, max = 100))]
    pub bus_name: String,
    #[validate(length(min = 1, max = 20))]
    pub plate_number: String,
    /// Standard coach layouts stop at row Y (4 seats per row)
    #[validate(range(min = 1, max = 100))]
    pub total_seats: u32,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(length(min = 1, max = 100))]
    pub departure_city: String,
    #[validate(length(min = 1, max = 100))]
    pub destination_city: String,
    pub departure_time: i64,
}

/// Publish a new trip (admin only)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateTripRequest>,
) -> AppResult<Json<ApiResponse<TripDetail>>> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Administrator role required"));
    }
    payload.validate()?;

    let trip = state.booking().create_trip(TripDraft {
        bus_name: payload.bus_name,
        plate_number: payload.plate_number,
        total_seats: payload.total_seats,
        price: payload.price,
        departure_city: payload.departure_city,
        destination_city: payload.destination_city,
        departure_time: payload.departure_time,
    })?;
    let detail = state.booking().get_trip_detail(trip.id)?;

    Ok(ok_with_message(detail, "Trip published"))
}

/// List all trips with availability
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<TripDetail>>>> {
    let trips = state.booking().list_trips()?;
    Ok(ok(trips))
}

/// Get trip by id with availability
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<TripDetail>>> {
    let detail = state.booking().get_trip_detail(id)?;
    Ok(ok(detail))
}
