//! Laundry Server - 洗衣平台订单定价与生命周期核心
//!
//! # 模块结构
//!
//! ```text
//! laundry-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 存储契约 + PostgreSQL / 内存实现
//! ├── scheduler/     # 取件日期计算
//! ├── pricing/       # 订单定价、称重、超重账单
//! ├── orders/        # 订单状态流转、订阅批次生成
//! └── utils/         # 日志、时钟、输入校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod pricing;
pub mod scheduler;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use db::{LaundryStore, MemoryStore, PgStore, StoreTx};
pub use orders::{Materializer, OrderLifecycle};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
