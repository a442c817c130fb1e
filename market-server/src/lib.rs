//! Market Server - 多边市场后端服务
//!
//! # 架构概述
//!
//! 本模块是市场后端的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储（模型 + 仓储层）
//! - **认证** (`auth`): JWT 认证体系 (buyer / supplier / admin)
//! - **HTTP API** (`api`): RESTful API 接口
//! - **订单工作流** (`orders`): 状态机 + 库存扣减 + 通知分发
//! - **预订工作流** (`reservations`): 接受/拒绝/过期/转订单
//! - **支付对账** (`payments`): 支付意向生命周期 + webhook
//!
//! # 模块结构
//!
//! ```text
//! market-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层（模型 + 仓储）
//! ├── notify/        # 通知分发器
//! ├── orders/        # 订单工作流
//! ├── reservations/  # 预订工作流
//! ├── payments/      # 支付对账
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService, Role};
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

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
