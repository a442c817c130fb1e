//! CurrentUser 提取器
//!
//! 受保护的 handler 直接声明 `user: CurrentUser` 参数即可拿到已验证的
//! 用户上下文；认证中间件已经验证过的请求复用扩展里的缓存结果。

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // 中间件已经放入扩展时直接复用
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                security_log!("WARN", "auth_missing", uri = parts.uri.to_string());
                AppError::unauthorized()
            })?;

        let token = JwtService::extract_from_header(header).ok_or_else(|| {
            AppError::invalid_token("Authorization header is not a bearer token")
        })?;

        let claims = state.get_jwt_service().validate_token(token).map_err(|e| {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = parts.uri.to_string()
            );
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })?;

        let user = CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;

        // 缓存到扩展，同一请求内的后续提取不再验证
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
