//! API Response types
//!
//! Standardized API response structures for the entire platform

use serde::{Deserialize, Serialize};

/// Unified API response envelope
///
/// All API responses follow this format:
/// ```json
/// {
///     "success": true,
///     "message": "Reservation created",
///     "data": { ... }
/// }
/// ```
///
/// Validation failures additionally carry field-level detail:
/// ```json
/// {
///     "success": false,
///     "message": "Validation failed",
///     "errors": { "selected_seat": ["must be at least 1"] }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Field-level validation errors (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    /// Create a successful response with custom message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            errors: None,
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    /// Create an error response with field-level detail
    pub fn error_with_fields(message: impl Into<String>, errors: serde_json::Value) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: Some(errors),
        }
    }
}

impl<T> Default for ApiResponse<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::ok(T::default())
    }
}

/// Empty response (unit type)
#[derive(Debug, Clone, Copy)]
pub struct Empty;

impl Serialize for Empty {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_none()
    }
}
