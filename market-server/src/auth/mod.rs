//! 认证模块
//!
//! JWT 令牌签发与验证、认证中间件、CurrentUser 提取器。

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, Role};
pub use middleware::require_auth;
