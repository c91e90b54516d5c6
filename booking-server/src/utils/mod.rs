//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`ApiResponse`] - API 响应结构 (from shared::response)
//! - 日志等工具

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult};
pub use error::{ok, ok_with_message};
pub use shared::ApiResponse;
