//! Trip and bus models

use serde::{Deserialize, Serialize};

/// Trip lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    /// Bookable
    Active,
    /// Departed and finished
    Completed,
    /// Cancelled by the operator
    Cancelled,
    /// Not yet published
    Draft,
    /// Reusable template, never bookable
    Template,
    /// Retired from listings
    Archived,
    /// Temporarily not bookable
    Suspended,
}

impl TripStatus {
    /// Only active trips accept new reservations
    pub fn is_bookable(&self) -> bool {
        matches!(self, TripStatus::Active)
    }
}

/// Bus snapshot embedded in a trip at creation time.
///
/// The snapshot is frozen for the trip's lifetime so later fleet edits
/// never change the seat plan or price of already-published trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusInfo {
    pub id: i64,
    pub name: String,
    pub plate_number: String,
    pub total_seats: u32,
    /// Labeled seat plan, e.g. `["A1", "A2", "A3", "A4", "B1", ...]`
    pub seat_layout: Vec<String>,
    /// Fare per seat
    pub price: f64,
}

impl BusInfo {
    /// Standard coach layout: rows of four, lettered from A upward
    /// (A1..A4, B1..B4, ...). Caps out at row Y, so buses carry at most
    /// 100 seats.
    pub fn standard_layout(total_seats: u32) -> Vec<String> {
        (0..total_seats)
            .map(|i| format!("{}{}", (b'A' + (i / 4) as u8) as char, i % 4 + 1))
            .collect()
    }

    /// Whether `seat` is part of this bus's seat plan
    pub fn has_seat(&self, seat: &str) -> bool {
        self.seat_layout.iter().any(|s| s == seat)
    }
}

/// A scheduled departure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    /// Bus snapshot taken at creation time
    pub bus: BusInfo,
    pub departure_city: String,
    pub destination_city: String,
    /// Departure time (Unix millis)
    pub departure_time: i64,
    pub status: TripStatus,
    pub created_at: i64,
}
