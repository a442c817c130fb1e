//! 认证与角色中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService, Role};
use crate::core::ServerState;
use crate::security_log;

/// 无需令牌即可访问的 API 前缀
///
/// - 注册/登录在拿到令牌之前就要可用
/// - webhook 由签名验证保护，不走 JWT
const PUBLIC_API_ROUTES: &[&str] = &["/api/health", "/api/auth/", "/api/payments/webhook"];

fn is_public(path: &str) -> bool {
    PUBLIC_API_ROUTES
        .iter()
        .any(|route| path == *route || (route.ends_with('/') && path.starts_with(route)))
}

/// 认证中间件
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，成功后把
/// [`CurrentUser`] 注入请求扩展。OPTIONS 预检、非 `/api/` 路径和
/// [`PUBLIC_API_ROUTES`] 直接放行。
///
/// 失败一律 401：缺头、过期、无效令牌分别带各自的错误码。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    let skip_auth = req.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || is_public(path);
    if skip_auth {
        return Ok(next.run(req).await);
    }

    let header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let Some(header) = header else {
        security_log!("WARN", "auth_missing", uri = req.uri().to_string());
        return Err(AppError::unauthorized());
    };
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Authorization header is not a bearer token"))?;

    let claims = state.get_jwt_service().validate_token(token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = e.to_string(),
            uri = req.uri().to_string()
        );
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// 角色检查中间件
///
/// 角色不匹配返回 403；管理员始终放行。挂在需要限定
/// buyer/supplier 的路由组上。
pub fn require_role(
    role: Role,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if user.role != role && !user.is_admin() {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id.clone(),
                    user_role = user.role.to_string(),
                    required_role = role.to_string()
                );
                return Err(AppError::forbidden(format!(
                    "{} role required",
                    role.as_str()
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_matching() {
        assert!(is_public("/api/health"));
        assert!(is_public("/api/auth/buyer/login"));
        assert!(is_public("/api/auth/supplier/register"));
        assert!(is_public("/api/payments/webhook"));

        assert!(!is_public("/api/orders"));
        assert!(!is_public("/api/payments/intent"));
        assert!(!is_public("/api/authx"));
    }
}
