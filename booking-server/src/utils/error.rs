//! 统一错误处理
//!
//! 提供应用级错误类型和响应包装：
//! - [`AppError`] - 应用错误枚举
//! - [`ok`] / [`ok_with_message`] - 成功响应帮助函数
//!
//! # 错误映射
//!
//! | 分类 | HTTP 状态码 |
//! |------|------------|
//! | 未登录 / 令牌错误 | 401 |
//! | 无权限 | 403 |
//! | 资源不存在 | 404 |
//! | 状态冲突 (占座、重复确认等) | 400 |
//! | 字段验证失败 | 422 |
//! | 存储 / 网关 / 内部错误 | 500 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Reservation not found"))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ApiResponse;
use tracing::error;

use crate::booking::BookingError;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (401) ==========
    #[error("Authentication required")]
    /// 未登录 (401)
    Unauthorized,

    #[error("Token expired")]
    /// 令牌过期 (401)
    TokenExpired,

    #[error("Invalid token: {0}")]
    /// 无效令牌 (401)
    InvalidToken(String),

    // ========== 权限错误 (403) ==========
    #[error("Permission denied: {0}")]
    /// 无权限 (403)
    Forbidden(String),

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Conflict: {0}")]
    /// 状态冲突 (400)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (422)
    Validation(String, Option<serde_json::Value>),

    // ========== 系统错误 (5xx) ==========
    #[error("Payment gateway error: {0}")]
    /// 支付网关错误 (500)
    Gateway(String),

    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Please login first".to_string(),
                None,
            ),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string(), None),
            AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string(), None)
            }

            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),

            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg, None),

            AppError::Validation(msg, errors) => (StatusCode::UNPROCESSABLE_ENTITY, msg, errors),

            AppError::Gateway(msg) => {
                error!(target: "gateway", error = %msg, "Payment gateway error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Payment gateway error".to_string(),
                    None,
                )
            }

            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match errors {
            Some(errors) => ApiResponse::<shared::response::Empty>::error_with_fields(message, errors),
            None => ApiResponse::<shared::response::Empty>::error(message),
        };

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::TripNotFound(_)
            | BookingError::ReservationNotFound(_)
            | BookingError::PaymentNotFound(_) => AppError::NotFound(e.to_string()),

            BookingError::TripNotActive(_)
            | BookingError::SeatOccupied { .. }
            | BookingError::AlreadyCancelled(_)
            | BookingError::ReservationCancelled(_)
            | BookingError::ReservationExpired(_)
            | BookingError::AlreadyConfirmed(_) => AppError::Conflict(e.to_string()),

            BookingError::SeatOutOfPlan { .. } | BookingError::PhoneNumberRequired => {
                AppError::Validation(e.to_string(), None)
            }

            BookingError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields = serde_json::to_value(e.field_errors()).unwrap_or(serde_json::Value::Null);
        AppError::Validation("Validation failed".to_string(), Some(fields))
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into(), None)
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok_with_message(data, message))
}
