//! Payment model

use serde::{Deserialize, Serialize};

/// Supported payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    MtnMomo,
    AirtelMoney,
}

impl PaymentMethod {
    /// Mobile money methods need a subscriber phone number
    pub fn requires_phone(&self) -> bool {
        matches!(self, PaymentMethod::MtnMomo | PaymentMethod::AirtelMoney)
    }
}

/// Payment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// A payment attempt for a reservation
///
/// The amount is always derived from the trip's bus price on the server;
/// client-supplied amounts are never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub reservation_id: i64,
    /// Externally visible gateway transaction ID (unique, indexed)
    pub transaction_id: String,
    /// Merchant reference shown on statements
    pub reference: String,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    pub created_at: i64,
}
