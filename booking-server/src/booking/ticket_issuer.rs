//! Ticket issuance
//!
//! Tickets are issued exactly once per confirmed reservation, always from
//! inside the payment-confirmation transaction. Calling [`issue`] again for
//! the same reservation returns the existing ticket unchanged.

use chrono::Utc;
use redb::WriteTransaction;
use sha2::{Digest, Sha256};
use shared::models::{Reservation, Ticket, TicketStatus, Trip};

use super::manager::BookingResult;
use super::storage::BookingStorage;

/// Issue (or return the existing) ticket for a confirmed reservation.
///
/// The ticket number counter is incremented inside the caller's write
/// transaction, so an aborted confirmation leaves no gap.
pub fn issue(
    storage: &BookingStorage,
    txn: &WriteTransaction,
    reservation: &Reservation,
    trip: &Trip,
) -> BookingResult<Ticket> {
    if let Some(existing) = storage.get_ticket_txn(txn, reservation.id)? {
        return Ok(existing);
    }

    let count = storage.next_ticket_count(txn)?;
    let date_str = Utc::now().format("%Y%m%d").to_string();
    let ticket_number = format!("TKT{}{}", date_str, 5000 + count);

    let ticket = Ticket {
        id: shared::util::snowflake_id(),
        reservation_id: reservation.id,
        qr_payload: qr_payload(&ticket_number, reservation, trip),
        ticket_number,
        status: TicketStatus::Valid,
        downloaded_at: None,
        issued_at: shared::util::now_millis(),
    };
    storage.store_ticket(txn, &ticket)?;

    tracing::info!(
        reservation_id = reservation.id,
        ticket_number = %ticket.ticket_number,
        "Ticket issued"
    );
    Ok(ticket)
}

/// Opaque verification payload encoded into the ticket QR code.
///
/// A SHA-256 digest rather than the raw fields, so a scanned code reveals
/// nothing about the passenger and can only be checked against the ledger.
fn qr_payload(ticket_number: &str, reservation: &Reservation, trip: &Trip) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ticket_number.as_bytes());
    hasher.update(b"|");
    hasher.update(reservation.id.to_le_bytes());
    hasher.update(b"|");
    hasher.update(trip.id.to_le_bytes());
    hasher.update(b"|");
    hasher.update(reservation.selected_seat.as_bytes());
    hex::encode(hasher.finalize())
}
