use thiserror::Error;

use crate::booking::BookingError;

/// 服务器级错误 (启动、运行阶段)
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("预订存储错误: {0}")]
    Booking(#[from] BookingError),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 服务器启动/运行的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
