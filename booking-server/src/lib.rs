//! Booking Server - 巴士票务预订服务
//!
//! # 架构概述
//!
//! 本模块是 Booking Server 的主入口，提供以下核心功能：
//!
//! - **预订业务** (`booking`): 座位占座、支付确认、出票的原子工作流
//! - **存储** (`booking::storage`): 嵌入式 redb 存储
//! - **认证** (`auth`): JWT 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证、属主检查
//! ├── booking/       # 预订工作流 (存储、管理器、出票、清扫)
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装、健康检查
//! └── utils/         # 错误、日志等工具
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod core;
pub mod routes;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use booking::{BookingManager, BookingStorage};
pub use core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
///
/// 必须在加载配置之前调用
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   _
   / __ )____  ____  / /__(_)___  ____ _
  / __  / __ \/ __ \/ //_/ / __ \/ __ `/
 / /_/ / /_/ / /_/ / ,< / / / / / /_/ /
/_____/\____/\____/_/|_/_/_/ /_/\__, /
                               /____/
    "#
    );
}
