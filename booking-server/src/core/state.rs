use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::booking::{BookingManager, ExpiryWorker};
use crate::core::{BackgroundTasks, Config};

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是预订服务的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | booking | Arc<BookingManager> | 预订业务管理器 (redb 存储) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 预订业务管理器
    pub booking: Arc<BookingManager>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize()`] 方法代替
    pub fn new(config: Config, booking: Arc<BookingManager>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            booking,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 预订管理器 (work_dir/database/booking.db)
    /// 3. JWT 服务
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize booking manager (redb)
        let db_path = config.database_dir().join("booking.db");
        let booking = BookingManager::new(
            &db_path,
            config.reservation_ttl_minutes,
            config.currency.clone(),
        )
        .expect("Failed to initialize booking database");

        // 2. Initialize JWT service
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self::new(config.clone(), Arc::new(booking), jwt_service)
    }

    /// 启动后台任务
    ///
    /// 必须在 HTTP 服务开始接收请求之前调用
    ///
    /// 启动的任务：
    /// - 预订过期清扫 (ExpiryWorker)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let worker = ExpiryWorker::new(
            self.booking.clone(),
            Duration::from_secs(self.config.sweep_interval_secs),
            tasks.shutdown_token(),
        );
        tasks.spawn("expiry_sweep", worker.run());

        tasks.log_summary();
        tasks
    }

    /// 获取预订管理器
    pub fn booking(&self) -> &Arc<BookingManager> {
        &self.booking
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
