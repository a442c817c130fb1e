use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::payments::processor::{HttpProcessor, MockProcessor, PaymentProcessor};

/// 服务器状态：配置 + 数据库 + 认证 + 支付处理器
///
/// handler 之间通过 `State<ServerState>` 共享；克隆只复制 Arc 引用。
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// 嵌入式 SurrealDB
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    /// 未配置网关时为 demo 实现，对账逻辑不感知差异
    pub payment_processor: Arc<dyn PaymentProcessor>,
}

impl ServerState {
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        payment_processor: Arc<dyn PaymentProcessor>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            payment_processor,
        }
    }

    /// 初始化：工作目录 → 数据库（含唯一索引）→ JWT → 支付处理器
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic（没有数据库就没有服务）
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("market.db");
        let db = crate::db::connect(&db_path)
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let payment_processor = Self::select_processor(config);

        Self::new(config.clone(), db, jwt_service, payment_processor)
    }

    /// 按配置选择支付处理器
    fn select_processor(config: &Config) -> Arc<dyn PaymentProcessor> {
        match (&config.payment_api_base, &config.payment_api_key) {
            (Some(base), Some(key)) => {
                tracing::info!(gateway = %base, "Payment gateway configured");
                Arc::new(HttpProcessor::new(base.clone(), key.clone()))
            }
            _ => {
                tracing::warn!("No payment gateway configured, using demo processor");
                Arc::new(MockProcessor::new())
            }
        }
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
