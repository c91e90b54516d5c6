//! API 路由模块
//!
//! # 结构
//!
//! - [`trips`] - 行程目录接口
//! - [`reservations`] - 座位预订接口
//! - [`payments`] - 支付确认接口

pub mod payments;
pub mod reservations;
pub mod trips;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ok};
