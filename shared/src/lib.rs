//! Shared types for the booking platform
//!
//! Domain models, the unified API response envelope and small
//! utilities used by both the server and test tooling.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    BusInfo, Payment, PaymentMethod, PaymentStatus, Reservation, ReservationStatus, Ticket,
    TicketStatus, Trip, TripStatus,
};
pub use response::ApiResponse;
