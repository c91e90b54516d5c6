//! Domain models
//!
//! | Model | Description |
//! |-------|-------------|
//! | [`Trip`] | Scheduled departure with an embedded bus snapshot |
//! | [`Reservation`] | A seat hold on a trip (pending → confirmed / cancelled) |
//! | [`Payment`] | Payment attempt for a reservation |
//! | [`Ticket`] | Issued travel document (one per confirmed reservation) |

pub mod payment;
pub mod reservation;
pub mod ticket;
pub mod trip;

pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use reservation::{Reservation, ReservationStatus};
pub use ticket::{Ticket, TicketStatus};
pub use trip::{BusInfo, Trip, TripStatus};
