//! Reservation model

use serde::{Deserialize, Serialize};

/// Reservation lifecycle status
///
/// ```text
/// pending ──confirm──▶ confirmed
///    │
///    └──cancel / expire──▶ cancelled
/// ```
///
/// `confirmed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

/// A seat hold on a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub trip_id: i64,
    /// Seat label from the bus layout, e.g. "B3"
    pub selected_seat: String,
    pub status: ReservationStatus,
    /// Hold deadline (Unix millis); only meaningful while pending
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    pub created_at: i64,
}

impl Reservation {
    /// A pending reservation past its deadline is expired but not yet
    /// transitioned; the transition is applied lazily or by the sweeper.
    pub fn is_expired(&self, now: i64) -> bool {
        self.status == ReservationStatus::Pending && now >= self.expires_at
    }
}
