//! Booking domain errors

use crate::booking::storage::StorageError;
use thiserror::Error;

/// Domain-level booking errors
///
/// Conflict-style variants correspond to state transitions that are legal
/// requests against an illegal current state; storage variants mean the
/// enclosing transaction was dropped without commit.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Trip not found: {0}")]
    TripNotFound(i64),

    #[error("Trip {0} is not open for booking")]
    TripNotActive(i64),

    #[error("Seat {seat} on trip {trip_id} is already taken")]
    SeatOccupied { trip_id: i64, seat: String },

    #[error("Seat {seat} is not part of the bus seat plan")]
    SeatOutOfPlan { seat: String },

    #[error("Reservation not found: {0}")]
    ReservationNotFound(i64),

    #[error("Reservation {0} is already cancelled")]
    AlreadyCancelled(i64),

    #[error("Reservation {0} has been cancelled")]
    ReservationCancelled(i64),

    #[error("Reservation {0} has expired")]
    ReservationExpired(i64),

    #[error("Reservation {0} is already confirmed")]
    AlreadyConfirmed(i64),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Phone number is required for mobile money payments")]
    PhoneNumberRequired,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<redb::CommitError> for BookingError {
    fn from(e: redb::CommitError) -> Self {
        BookingError::Storage(StorageError::Commit(e))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
