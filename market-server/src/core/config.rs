use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::JwtConfig;

/// 环境变量优先的服务器配置
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/market | 数据库与日志的根目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | development / staging / production |
/// | PAYMENT_API_BASE | — | 支付网关地址；缺省走 demo 处理器 |
/// | PAYMENT_API_KEY | — | 支付网关密钥 |
/// | PAYMENT_WEBHOOK_SECRET | — | webhook 签名共享密钥 |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    pub environment: String,
    pub payment_api_base: Option<String>,
    pub payment_api_key: Option<String>,
    pub payment_webhook_secret: Option<String>,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载，缺省值见上表
    pub fn from_env() -> Self {
        Self {
            work_dir: env_or("WORK_DIR", "/var/lib/market".to_string()),
            http_port: env_or("HTTP_PORT", 3000),
            jwt: JwtConfig::default(),
            environment: env_or("ENVIRONMENT", "development".to_string()),
            payment_api_base: std::env::var("PAYMENT_API_BASE").ok(),
            payment_api_key: std::env::var("PAYMENT_API_KEY").ok(),
            payment_webhook_secret: std::env::var("PAYMENT_WEBHOOK_SECRET").ok(),
        }
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
