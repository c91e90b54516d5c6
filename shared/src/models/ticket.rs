//! Ticket model

use serde::{Deserialize, Serialize};

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Valid,
    Cancelled,
}

/// Issued travel document, one per confirmed reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub reservation_id: i64,
    /// `TKT<yyyymmdd><counter>`, crash-safe via a storage counter
    pub ticket_number: String,
    /// SHA-256 digest over ticket number, reservation, trip and seat (hex)
    pub qr_payload: String,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<i64>,
    pub issued_at: i64,
}
