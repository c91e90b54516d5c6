//! BookingManager - reservation and payment lifecycle processing
//!
//! Single mutation path for the booking workflow. Every state transition
//! runs inside one redb write transaction; redb serializes write
//! transactions, so conflicting seat claims are decided in order and a
//! failed transition is dropped without commit.
//!
//! # Atomic units
//!
//! ```text
//! create_reservation   check trip → check seat → insert hold → claim seat
//! cancel / expire      release seat → cancel ticket → stamp cancelled_at
//! confirm_payment      payment completed → reservation confirmed → ticket issued
//! ```

mod error;
pub use error::*;

use super::storage::BookingStorage;
use super::ticket_issuer;
use serde::Serialize;
use shared::models::{
    BusInfo, Payment, PaymentMethod, PaymentStatus, Reservation, ReservationStatus, Ticket, Trip,
    TripStatus,
};
use std::path::Path;

/// Trip with its derived seat availability
#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    /// Seat labels of non-cancelled reservations, in label order
    pub occupied_seats: Vec<String>,
    pub available_seats: u32,
}

/// Reservation with its related records attached
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub trip: Option<Trip>,
    /// Most recent payment attempt, if any
    pub payment: Option<Payment>,
    pub ticket: Option<Ticket>,
}

/// Result of initiating a payment
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSession {
    pub payment: Payment,
    /// Hold deadline of the reservation being paid for
    pub expires_at: i64,
}

/// Result of a (idempotent) payment confirmation
#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfirmation {
    pub payment: Payment,
    pub reservation: Reservation,
    pub ticket: Ticket,
}

/// Input for publishing a trip
#[derive(Debug, Clone)]
pub struct TripDraft {
    pub bus_name: String,
    pub plate_number: String,
    pub total_seats: u32,
    pub price: f64,
    pub departure_city: String,
    pub destination_city: String,
    pub departure_time: i64,
}

/// BookingManager for reservation, payment and ticket processing
#[derive(Clone)]
pub struct BookingManager {
    storage: BookingStorage,
    /// Hold duration for new reservations (millis)
    reservation_ttl_ms: i64,
    currency: String,
}

impl std::fmt::Debug for BookingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingManager")
            .field("storage", &"<BookingStorage>")
            .field("reservation_ttl_ms", &self.reservation_ttl_ms)
            .field("currency", &self.currency)
            .finish()
    }
}

impl BookingManager {
    /// Create a new BookingManager with the given database path
    pub fn new(
        db_path: impl AsRef<Path>,
        reservation_ttl_minutes: i64,
        currency: impl Into<String>,
    ) -> BookingResult<Self> {
        let storage = BookingStorage::open(db_path)?;
        Ok(Self {
            storage,
            reservation_ttl_ms: reservation_ttl_minutes * 60_000,
            currency: currency.into(),
        })
    }

    /// Create a BookingManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: BookingStorage) -> Self {
        Self {
            storage,
            reservation_ttl_ms: 15 * 60_000,
            currency: "RWF".to_string(),
        }
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &BookingStorage {
        &self.storage
    }

    // ========== Trip Catalog ==========

    /// Publish a new trip with a frozen bus snapshot
    pub fn create_trip(&self, draft: TripDraft) -> BookingResult<Trip> {
        let trip = Trip {
            id: shared::util::snowflake_id(),
            bus: BusInfo {
                id: shared::util::snowflake_id(),
                name: draft.bus_name,
                plate_number: draft.plate_number,
                total_seats: draft.total_seats,
                seat_layout: BusInfo::standard_layout(draft.total_seats),
                price: draft.price,
            },
            departure_city: draft.departure_city,
            destination_city: draft.destination_city,
            departure_time: draft.departure_time,
            status: TripStatus::Active,
            created_at: shared::util::now_millis(),
        };

        let txn = self.storage.begin_write()?;
        self.storage.store_trip(&txn, &trip)?;
        txn.commit()?;

        tracing::info!(
            trip_id = trip.id,
            route = format!("{} -> {}", trip.departure_city, trip.destination_city),
            "Trip published"
        );
        Ok(trip)
    }

    /// Get a trip with its derived seat availability
    pub fn get_trip_detail(&self, trip_id: i64) -> BookingResult<TripDetail> {
        let trip = self
            .storage
            .get_trip(trip_id)?
            .ok_or(BookingError::TripNotFound(trip_id))?;
        self.attach_availability(trip)
    }

    /// List all trips with availability
    pub fn list_trips(&self) -> BookingResult<Vec<TripDetail>> {
        self.storage
            .get_all_trips()?
            .into_iter()
            .map(|trip| self.attach_availability(trip))
            .collect()
    }

    fn attach_availability(&self, trip: Trip) -> BookingResult<TripDetail> {
        let occupied_seats = self.storage.occupied_seats(trip.id)?;
        let available_seats = trip.bus.total_seats.saturating_sub(occupied_seats.len() as u32);
        Ok(TripDetail {
            trip,
            occupied_seats,
            available_seats,
        })
    }

    // ========== Reservation Lifecycle ==========

    /// Place a hold on a seat.
    ///
    /// One write transaction: trip must exist and be active, the seat must
    /// be inside the bus seat plan and unclaimed. The hold expires after
    /// the configured TTL unless payment confirms it first.
    pub fn create_reservation(
        &self,
        user_id: i64,
        trip_id: i64,
        seat: &str,
    ) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;

        let trip = self
            .storage
            .get_trip_txn(&txn, trip_id)?
            .ok_or(BookingError::TripNotFound(trip_id))?;
        if !trip.status.is_bookable() {
            return Err(BookingError::TripNotActive(trip_id));
        }
        if !trip.bus.has_seat(seat) {
            return Err(BookingError::SeatOutOfPlan {
                seat: seat.to_string(),
            });
        }
        if self.storage.seat_holder_txn(&txn, trip_id, seat)?.is_some() {
            return Err(BookingError::SeatOccupied {
                trip_id,
                seat: seat.to_string(),
            });
        }

        let now = shared::util::now_millis();
        let reservation = Reservation {
            id: shared::util::snowflake_id(),
            user_id,
            trip_id,
            selected_seat: seat.to_string(),
            status: ReservationStatus::Pending,
            expires_at: now + self.reservation_ttl_ms,
            cancelled_at: None,
            created_at: now,
        };

        self.storage.store_reservation(&txn, &reservation)?;
        self.storage.occupy_seat(&txn, trip_id, seat, reservation.id)?;
        self.storage.mark_pending(&txn, reservation.expires_at, reservation.id)?;
        txn.commit()?;

        tracing::info!(
            reservation_id = reservation.id,
            user_id,
            trip_id,
            seat,
            expires_at = reservation.expires_at,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Get a reservation with trip, latest payment and ticket attached
    pub fn get_reservation_detail(&self, reservation_id: i64) -> BookingResult<ReservationDetail> {
        let reservation = self
            .storage
            .get_reservation(reservation_id)?
            .ok_or(BookingError::ReservationNotFound(reservation_id))?;
        self.attach_related(reservation)
    }

    /// All reservations of a user, newest first
    pub fn list_user_reservations(&self, user_id: i64) -> BookingResult<Vec<ReservationDetail>> {
        self.storage
            .get_reservations_for_user(user_id)?
            .into_iter()
            .map(|reservation| self.attach_related(reservation))
            .collect()
    }

    fn attach_related(&self, reservation: Reservation) -> BookingResult<ReservationDetail> {
        let trip = self.storage.get_trip(reservation.trip_id)?;
        let payment = self.storage.latest_payment_for_reservation(reservation.id)?;
        let ticket = self.storage.get_ticket(reservation.id)?;
        Ok(ReservationDetail {
            reservation,
            trip,
            payment,
            ticket,
        })
    }

    /// Cancel a reservation and free its seat.
    ///
    /// Works on pending and confirmed reservations; a ticket issued for a
    /// confirmed reservation is cancelled in the same transaction.
    pub fn cancel_reservation(&self, reservation_id: i64) -> BookingResult<Reservation> {
        let txn = self.storage.begin_write()?;

        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, reservation_id)?
            .ok_or(BookingError::ReservationNotFound(reservation_id))?;
        if reservation.status == ReservationStatus::Cancelled {
            return Err(BookingError::AlreadyCancelled(reservation_id));
        }

        self.storage
            .release_seat(&txn, reservation.trip_id, &reservation.selected_seat)?;
        self.storage
            .clear_pending(&txn, reservation.expires_at, reservation.id)?;

        if let Some(mut ticket) = self.storage.get_ticket_txn(&txn, reservation.id)? {
            ticket.status = shared::models::TicketStatus::Cancelled;
            self.storage.store_ticket(&txn, &ticket)?;
        }

        reservation.status = ReservationStatus::Cancelled;
        reservation.cancelled_at = Some(shared::util::now_millis());
        self.storage.store_reservation(&txn, &reservation)?;
        txn.commit()?;

        tracing::info!(
            reservation_id,
            trip_id = reservation.trip_id,
            seat = %reservation.selected_seat,
            "Reservation cancelled"
        );
        Ok(reservation)
    }

    /// Expire overdue holds. Invoked by the sweep worker on an interval.
    ///
    /// Runs the same cancel-and-release transition as [`cancel_reservation`]
    /// for every pending reservation past its deadline. Returns the number
    /// of reservations expired.
    pub fn sweep_expired(&self, now: i64) -> BookingResult<usize> {
        let overdue = self.storage.expired_pending(now)?;
        if overdue.is_empty() {
            return Ok(0);
        }

        let txn = self.storage.begin_write()?;
        let mut expired = 0;
        for reservation_id in overdue {
            // Re-check inside the transaction: a confirmation may have won
            // the race between the queue scan and this write lock.
            if let Some(mut reservation) = self.storage.get_reservation_txn(&txn, reservation_id)?
                && reservation.is_expired(now)
            {
                self.expire_in_txn(&txn, &mut reservation)?;
                expired += 1;
            }
        }
        txn.commit()?;

        if expired > 0 {
            tracing::info!(expired, "Expired overdue reservations");
        }
        Ok(expired)
    }

    /// Cancel an expired hold inside an open transaction
    fn expire_in_txn(
        &self,
        txn: &redb::WriteTransaction,
        reservation: &mut Reservation,
    ) -> BookingResult<()> {
        self.storage
            .release_seat(txn, reservation.trip_id, &reservation.selected_seat)?;
        self.storage
            .clear_pending(txn, reservation.expires_at, reservation.id)?;
        reservation.status = ReservationStatus::Cancelled;
        reservation.cancelled_at = Some(shared::util::now_millis());
        self.storage.store_reservation(txn, reservation)?;
        tracing::info!(
            reservation_id = reservation.id,
            trip_id = reservation.trip_id,
            seat = %reservation.selected_seat,
            "Reservation expired"
        );
        Ok(())
    }

    // ========== Payment Lifecycle ==========

    /// Start a payment for a pending reservation.
    ///
    /// The amount is always the trip's bus price; whatever the client sent
    /// is ignored. An overdue hold is expired (and that expiry committed)
    /// before the error is returned, so the seat frees up immediately
    /// instead of waiting for the sweeper.
    pub fn initiate_payment(
        &self,
        reservation_id: i64,
        method: PaymentMethod,
        phone_number: Option<String>,
    ) -> BookingResult<PaymentSession> {
        let txn = self.storage.begin_write()?;

        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, reservation_id)?
            .ok_or(BookingError::ReservationNotFound(reservation_id))?;
        match reservation.status {
            ReservationStatus::Cancelled => {
                return Err(BookingError::ReservationCancelled(reservation_id));
            }
            ReservationStatus::Confirmed => {
                return Err(BookingError::AlreadyConfirmed(reservation_id));
            }
            ReservationStatus::Pending => {}
        }

        let now = shared::util::now_millis();
        if reservation.is_expired(now) {
            // Lazy expiry: commit the transition, then report it.
            self.expire_in_txn(&txn, &mut reservation)?;
            txn.commit()?;
            return Err(BookingError::ReservationExpired(reservation_id));
        }

        if method.requires_phone() && phone_number.as_deref().unwrap_or("").is_empty() {
            return Err(BookingError::PhoneNumberRequired);
        }

        let trip = self
            .storage
            .get_trip_txn(&txn, reservation.trip_id)?
            .ok_or(BookingError::TripNotFound(reservation.trip_id))?;

        let payment = Payment {
            id: shared::util::snowflake_id(),
            reservation_id,
            transaction_id: format!("TXN-{}", uuid::Uuid::new_v4()),
            reference: format!("BUS-{}-{}", reservation.trip_id, reservation_id),
            amount: trip.bus.price,
            currency: self.currency.clone(),
            method,
            phone_number,
            status: PaymentStatus::Pending,
            completed_at: None,
            created_at: now,
        };
        self.storage.store_payment(&txn, &payment)?;
        txn.commit()?;

        tracing::info!(
            reservation_id,
            payment_id = payment.id,
            transaction_id = %payment.transaction_id,
            amount = payment.amount,
            method = ?payment.method,
            "Payment initiated"
        );
        Ok(PaymentSession {
            payment,
            expires_at: reservation.expires_at,
        })
    }

    /// Confirm a payment by gateway transaction ID (idempotent).
    ///
    /// Payment completed, reservation confirmed and ticket issued in one
    /// write transaction. A repeat confirmation for an already-completed
    /// payment returns the existing records without writing anything.
    pub fn confirm_payment(&self, transaction_id: &str) -> BookingResult<PaymentConfirmation> {
        let txn = self.storage.begin_write()?;

        let mut payment = self
            .storage
            .find_payment_by_transaction_txn(&txn, transaction_id)?
            .ok_or_else(|| BookingError::PaymentNotFound(transaction_id.to_string()))?;
        let mut reservation = self
            .storage
            .get_reservation_txn(&txn, payment.reservation_id)?
            .ok_or(BookingError::ReservationNotFound(payment.reservation_id))?;

        if payment.status == PaymentStatus::Completed {
            // Already converged; the ticket issue below only runs if a
            // crash interrupted a previous confirmation mid-transaction.
            if let Some(ticket) = self.storage.get_ticket_txn(&txn, reservation.id)? {
                return Ok(PaymentConfirmation {
                    payment,
                    reservation,
                    ticket,
                });
            }
        }

        if reservation.status == ReservationStatus::Cancelled {
            return Err(BookingError::ReservationCancelled(reservation.id));
        }

        // A payment that already completed keeps its original completion
        // timestamp; the recovery path re-runs only the tail below.
        if payment.status != PaymentStatus::Completed {
            payment.status = PaymentStatus::Completed;
            payment.completed_at = Some(shared::util::now_millis());
            self.storage.update_payment(&txn, &payment)?;
        }

        if reservation.status == ReservationStatus::Pending {
            self.storage
                .clear_pending(&txn, reservation.expires_at, reservation.id)?;
            reservation.status = ReservationStatus::Confirmed;
            self.storage.store_reservation(&txn, &reservation)?;
        }

        let trip = self
            .storage
            .get_trip_txn(&txn, reservation.trip_id)?
            .ok_or(BookingError::TripNotFound(reservation.trip_id))?;
        let ticket = ticket_issuer::issue(&self.storage, &txn, &reservation, &trip)?;
        txn.commit()?;

        tracing::info!(
            reservation_id = reservation.id,
            transaction_id,
            ticket_number = %ticket.ticket_number,
            "Payment confirmed"
        );
        Ok(PaymentConfirmation {
            payment,
            reservation,
            ticket,
        })
    }

    /// Record a failed payment attempt.
    ///
    /// The reservation stays pending: the passenger may retry with another
    /// method until the hold expires.
    pub fn fail_payment(&self, transaction_id: &str) -> BookingResult<Payment> {
        let txn = self.storage.begin_write()?;

        let mut payment = self
            .storage
            .find_payment_by_transaction_txn(&txn, transaction_id)?
            .ok_or_else(|| BookingError::PaymentNotFound(transaction_id.to_string()))?;
        match payment.status {
            // A completed payment cannot be walked back by a late failure
            // notification.
            PaymentStatus::Completed => {
                return Err(BookingError::AlreadyConfirmed(payment.reservation_id));
            }
            PaymentStatus::Failed => return Ok(payment),
            PaymentStatus::Pending => {}
        }

        payment.status = PaymentStatus::Failed;
        self.storage.update_payment(&txn, &payment)?;
        txn.commit()?;

        tracing::info!(
            payment_id = payment.id,
            transaction_id,
            reservation_id = payment.reservation_id,
            "Payment failed"
        );
        Ok(payment)
    }
}

#[cfg(test)]
mod tests;
