//! Booking workflow: trip ledger, reservations, payments, tickets
//!
//! ```text
//! booking/
//! ├── storage.rs        # redb tables and transaction helpers
//! ├── manager/          # BookingManager (all state transitions)
//! ├── ticket_issuer.rs  # exactly-once ticket issuance
//! └── expiry_worker.rs  # periodic sweep of overdue holds
//! ```

pub mod expiry_worker;
pub mod manager;
pub mod storage;
pub mod ticket_issuer;

pub use expiry_worker::ExpiryWorker;
pub use manager::{
    BookingError, BookingManager, BookingResult, PaymentConfirmation, PaymentSession,
    ReservationDetail, TripDetail, TripDraft,
};
pub use storage::{BookingStorage, StorageError, StorageResult};
