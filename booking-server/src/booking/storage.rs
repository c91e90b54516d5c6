//! redb-based storage layer for the booking workflow
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `trips` | `trip_id` | `Trip` | Trip catalog |
//! | `reservations` | `reservation_id` | `Reservation` | Seat holds |
//! | `payments` | `payment_id` | `Payment` | Payment attempts |
//! | `tickets` | `reservation_id` | `Ticket` | Issued tickets (1:1) |
//! | `seat_index` | `(trip_id, seat_label)` | `reservation_id` | Occupied-seat view |
//! | `payment_tx_index` | `transaction_id` | `payment_id` | Gateway lookup |
//! | `reservation_payments` | `(reservation_id, payment_id)` | `()` | Payment history |
//! | `user_reservations` | `(user_id, reservation_id)` | `()` | Per-user listing |
//! | `pending_expiry` | `(expires_at, reservation_id)` | `()` | Sweep queue |
//! | `counters` | `name` | `u64` | Ticket number counter |
//!
//! # Consistency
//!
//! `seat_index` is the authoritative occupied-seat set. It is only ever
//! mutated inside the same write transaction as the reservation transition
//! that justifies it, so `occupied == seats of non-cancelled reservations`
//! holds at every commit point. redb commits are durable when `commit()`
//! returns and the file is always in a consistent state, which matters for
//! a ledger that must never double-sell a seat after a crash.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Payment, Reservation, Ticket, Trip};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Trip catalog: key = trip_id, value = JSON-serialized Trip
const TRIPS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("trips");

/// Reservations: key = reservation_id, value = JSON-serialized Reservation
const RESERVATIONS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("reservations");

/// Payments: key = payment_id, value = JSON-serialized Payment
const PAYMENTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("payments");

/// Tickets: key = reservation_id (1:1), value = JSON-serialized Ticket
const TICKETS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("tickets");

/// Occupied seats: key = (trip_id, seat_label), value = holding reservation_id
const SEAT_INDEX_TABLE: TableDefinition<(i64, &'static str), i64> =
    TableDefinition::new("seat_index");

/// Gateway lookup: key = transaction_id, value = payment_id
const PAYMENT_TX_TABLE: TableDefinition<&str, i64> = TableDefinition::new("payment_tx_index");

/// Payment history per reservation: key = (reservation_id, payment_id)
const RESERVATION_PAYMENTS_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("reservation_payments");

/// Per-user reservation listing: key = (user_id, reservation_id)
const USER_RESERVATIONS_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("user_reservations");

/// Sweep queue: key = (expires_at, reservation_id), value = empty
const PENDING_EXPIRY_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("pending_expiry");

/// Counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const TICKET_COUNT_KEY: &str = "ticket_count";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Booking storage backed by redb
#[derive(Clone)]
pub struct BookingStorage {
    db: Arc<Database>,
}

impl BookingStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(TRIPS_TABLE)?;
            let _ = write_txn.open_table(RESERVATIONS_TABLE)?;
            let _ = write_txn.open_table(PAYMENTS_TABLE)?;
            let _ = write_txn.open_table(TICKETS_TABLE)?;
            let _ = write_txn.open_table(SEAT_INDEX_TABLE)?;
            let _ = write_txn.open_table(PAYMENT_TX_TABLE)?;
            let _ = write_txn.open_table(RESERVATION_PAYMENTS_TABLE)?;
            let _ = write_txn.open_table(USER_RESERVATIONS_TABLE)?;
            let _ = write_txn.open_table(PENDING_EXPIRY_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(TICKET_COUNT_KEY)?.is_none() {
                counters.insert(TICKET_COUNT_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// redb admits one write transaction at a time, which serializes all
    /// seat claims and lifecycle transitions.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Trip Operations ==========

    /// Store a trip (insert or overwrite)
    pub fn store_trip(&self, txn: &WriteTransaction, trip: &Trip) -> StorageResult<()> {
        let mut table = txn.open_table(TRIPS_TABLE)?;
        let value = serde_json::to_vec(trip)?;
        table.insert(trip.id, value.as_slice())?;
        Ok(())
    }

    /// Get a trip by ID (read-only)
    pub fn get_trip(&self, trip_id: i64) -> StorageResult<Option<Trip>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRIPS_TABLE)?;
        match table.get(trip_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a trip by ID (within transaction)
    pub fn get_trip_txn(&self, txn: &WriteTransaction, trip_id: i64) -> StorageResult<Option<Trip>> {
        let table = txn.open_table(TRIPS_TABLE)?;
        match table.get(trip_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all trips
    pub fn get_all_trips(&self) -> StorageResult<Vec<Trip>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRIPS_TABLE)?;

        let mut trips = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            trips.push(serde_json::from_slice(value.value())?);
        }
        Ok(trips)
    }

    // ========== Reservation Operations ==========

    /// Store a reservation and keep the per-user index in step
    pub fn store_reservation(
        &self,
        txn: &WriteTransaction,
        reservation: &Reservation,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(RESERVATIONS_TABLE)?;
        let value = serde_json::to_vec(reservation)?;
        table.insert(reservation.id, value.as_slice())?;
        drop(table);

        let mut index = txn.open_table(USER_RESERVATIONS_TABLE)?;
        index.insert((reservation.user_id, reservation.id), ())?;
        Ok(())
    }

    /// Get a reservation by ID (read-only)
    pub fn get_reservation(&self, reservation_id: i64) -> StorageResult<Option<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;
        match table.get(reservation_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a reservation by ID (within transaction)
    pub fn get_reservation_txn(
        &self,
        txn: &WriteTransaction,
        reservation_id: i64,
    ) -> StorageResult<Option<Reservation>> {
        let table = txn.open_table(RESERVATIONS_TABLE)?;
        match table.get(reservation_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get all reservations for a user (newest first)
    pub fn get_reservations_for_user(&self, user_id: i64) -> StorageResult<Vec<Reservation>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_RESERVATIONS_TABLE)?;
        let table = read_txn.open_table(RESERVATIONS_TABLE)?;

        let mut reservations = Vec::new();
        let range_start = (user_id, i64::MIN);
        let range_end = (user_id, i64::MAX);
        for result in index.range(range_start..=range_end)? {
            let (key, _) = result?;
            let (_, reservation_id) = key.value();
            if let Some(value) = table.get(reservation_id)? {
                reservations.push(serde_json::from_slice::<Reservation>(value.value())?);
            }
        }

        reservations.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(reservations)
    }

    // ========== Seat Index (Trip Ledger) ==========

    /// Reservation currently holding a seat, if any (within transaction)
    pub fn seat_holder_txn(
        &self,
        txn: &WriteTransaction,
        trip_id: i64,
        seat: &str,
    ) -> StorageResult<Option<i64>> {
        let table = txn.open_table(SEAT_INDEX_TABLE)?;
        Ok(table.get((trip_id, seat))?.map(|guard| guard.value()))
    }

    /// Claim a seat for a reservation (within transaction)
    pub fn occupy_seat(
        &self,
        txn: &WriteTransaction,
        trip_id: i64,
        seat: &str,
        reservation_id: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SEAT_INDEX_TABLE)?;
        table.insert((trip_id, seat), reservation_id)?;
        Ok(())
    }

    /// Release a seat (within transaction, idempotent)
    pub fn release_seat(
        &self,
        txn: &WriteTransaction,
        trip_id: i64,
        seat: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SEAT_INDEX_TABLE)?;
        table.remove((trip_id, seat))?;
        Ok(())
    }

    /// Occupied seat labels of a trip, in label order (read-only)
    pub fn occupied_seats(&self, trip_id: i64) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEAT_INDEX_TABLE)?;

        let mut seats = Vec::new();
        for result in table.range((trip_id, "")..)? {
            let (key, _) = result?;
            let (key_trip, seat) = key.value();
            if key_trip != trip_id {
                break;
            }
            seats.push(seat.to_string());
        }
        Ok(seats)
    }

    // ========== Payment Operations ==========

    /// Store a payment and keep both lookup indexes in step
    pub fn store_payment(&self, txn: &WriteTransaction, payment: &Payment) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENTS_TABLE)?;
        let value = serde_json::to_vec(payment)?;
        table.insert(payment.id, value.as_slice())?;
        drop(table);

        let mut tx_index = txn.open_table(PAYMENT_TX_TABLE)?;
        tx_index.insert(payment.transaction_id.as_str(), payment.id)?;
        drop(tx_index);

        let mut history = txn.open_table(RESERVATION_PAYMENTS_TABLE)?;
        history.insert((payment.reservation_id, payment.id), ())?;
        Ok(())
    }

    /// Update an existing payment row without touching indexes
    pub fn update_payment(&self, txn: &WriteTransaction, payment: &Payment) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENTS_TABLE)?;
        let value = serde_json::to_vec(payment)?;
        table.insert(payment.id, value.as_slice())?;
        Ok(())
    }

    /// Look up a payment by gateway transaction ID (read-only)
    pub fn find_payment_by_transaction(&self, transaction_id: &str) -> StorageResult<Option<Payment>> {
        let read_txn = self.db.begin_read()?;
        let tx_index = read_txn.open_table(PAYMENT_TX_TABLE)?;
        let payment_id = match tx_index.get(transaction_id)? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(PAYMENTS_TABLE)?;
        match table.get(payment_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a payment by gateway transaction ID (within transaction)
    pub fn find_payment_by_transaction_txn(
        &self,
        txn: &WriteTransaction,
        transaction_id: &str,
    ) -> StorageResult<Option<Payment>> {
        let tx_index = txn.open_table(PAYMENT_TX_TABLE)?;
        let payment_id = match tx_index.get(transaction_id)? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };
        drop(tx_index);

        let table = txn.open_table(PAYMENTS_TABLE)?;
        match table.get(payment_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Latest payment attempt for a reservation, if any (read-only)
    ///
    /// Payment IDs are time-ordered snowflakes, so the highest ID in the
    /// history index is the most recent attempt.
    pub fn latest_payment_for_reservation(
        &self,
        reservation_id: i64,
    ) -> StorageResult<Option<Payment>> {
        let read_txn = self.db.begin_read()?;
        let history = read_txn.open_table(RESERVATION_PAYMENTS_TABLE)?;

        let range_start = (reservation_id, i64::MIN);
        let range_end = (reservation_id, i64::MAX);
        let latest_id = history
            .range(range_start..=range_end)?
            .next_back()
            .transpose()?
            .map(|(key, _)| key.value().1);

        let payment_id = match latest_id {
            Some(id) => id,
            None => return Ok(None),
        };

        let table = read_txn.open_table(PAYMENTS_TABLE)?;
        match table.get(payment_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Ticket Operations ==========

    /// Store a ticket, keyed by reservation ID
    pub fn store_ticket(&self, txn: &WriteTransaction, ticket: &Ticket) -> StorageResult<()> {
        let mut table = txn.open_table(TICKETS_TABLE)?;
        let value = serde_json::to_vec(ticket)?;
        table.insert(ticket.reservation_id, value.as_slice())?;
        Ok(())
    }

    /// Get the ticket for a reservation (read-only)
    pub fn get_ticket(&self, reservation_id: i64) -> StorageResult<Option<Ticket>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TICKETS_TABLE)?;
        match table.get(reservation_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get the ticket for a reservation (within transaction)
    pub fn get_ticket_txn(
        &self,
        txn: &WriteTransaction,
        reservation_id: i64,
    ) -> StorageResult<Option<Ticket>> {
        let table = txn.open_table(TICKETS_TABLE)?;
        match table.get(reservation_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Pending Expiry Queue ==========

    /// Enqueue a pending reservation for the sweeper
    pub fn mark_pending(
        &self,
        txn: &WriteTransaction,
        expires_at: i64,
        reservation_id: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_EXPIRY_TABLE)?;
        table.insert((expires_at, reservation_id), ())?;
        Ok(())
    }

    /// Dequeue a reservation (idempotent; called on confirm, cancel, expire)
    pub fn clear_pending(
        &self,
        txn: &WriteTransaction,
        expires_at: i64,
        reservation_id: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PENDING_EXPIRY_TABLE)?;
        table.remove((expires_at, reservation_id))?;
        Ok(())
    }

    /// Reservation IDs whose hold deadline has passed (read-only)
    ///
    /// Keys are ordered by `expires_at`, so this is a prefix scan that stops
    /// at `now` without touching live holds.
    pub fn expired_pending(&self, now: i64) -> StorageResult<Vec<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_EXPIRY_TABLE)?;

        let mut ids = Vec::new();
        for result in table.range(..=(now, i64::MAX))? {
            let (key, _) = result?;
            let (_, reservation_id) = key.value();
            ids.push(reservation_id);
        }
        Ok(ids)
    }

    // ========== Ticket Counter ==========

    /// Increment and return the ticket counter (within transaction)
    ///
    /// Allocated inside the confirmation transaction so an aborted
    /// confirmation never burns a ticket number out of sequence; redb
    /// forbids nested write transactions, so a separate committing counter
    /// would deadlock here anyway.
    pub fn next_ticket_count(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(TICKET_COUNT_KEY)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(TICKET_COUNT_KEY, next)?;
        Ok(next)
    }
}
