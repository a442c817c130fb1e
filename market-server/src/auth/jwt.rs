//! JWT 令牌服务
//!
//! 签发与验证携带 `{sub, role, email}` 的 HS256 令牌。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// 签名密钥，至少 32 字节
    pub secret: String,
    /// 令牌有效期 (分钟)
    pub expiration_minutes: i64,
    /// 签发者
    pub issuer: String,
    /// 受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: resolve_secret(),
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 60),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "market-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "market-clients".to_string()),
        }
    }
}

/// 取 JWT_SECRET；开发环境缺失时生成临时密钥，生产环境直接拒绝启动
fn resolve_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET shorter than 32 bytes, generating a temporary key");
                generated_dev_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("FATAL: JWT_SECRET must be at least 32 characters long");
            }
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                generated_dev_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("FATAL: JWT_SECRET environment variable must be set in production");
            }
        }
    }
}

/// 64 个可打印字符的随机密钥 (仅开发环境)
fn generated_dev_secret() -> String {
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut raw = [0u8; 64];
    if rng.fill(&mut raw).is_err() {
        // 随机源不可用时的固定兜底
        return "MarketServerDevelopmentFallbackKey2025!!".to_string();
    }
    raw.iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect()
}

/// 市场参与者角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Supplier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "supplier" => Ok(Role::Supplier),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// 令牌负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID ("buyer:…" / "supplier:…")
    pub sub: String,
    /// buyer | supplier | admin
    pub role: String,
    /// 账号邮箱
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    /// 为用户签发令牌
    pub fn generate_token(
        &self,
        user_id: &str,
        role: Role,
        email: &str,
    ) -> Result<String, JwtError> {
        let issued = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            email: email.to_string(),
            exp: (issued + Duration::minutes(self.config.expiration_minutes)).timestamp(),
            iat: issued.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    fn validation_rules(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation_rules())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// 从 Authorization 头取出裸令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前用户上下文，由中间件/提取器从 Claims 构造
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
    pub email: String,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            role: claims.role.parse::<Role>()?,
            id: claims.sub,
            email: claims.email,
        })
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_buyer(&self) -> bool {
        self.role == Role::Buyer
    }

    pub fn is_supplier(&self) -> bool {
        self.role == Role::Supplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-at-least-32-characters!!".to_string(),
            expiration_minutes: 60,
            issuer: "market-server".to_string(),
            audience: "market-clients".to_string(),
        })
    }

    #[test]
    fn test_round_trip() {
        let service = test_service();

        let token = service
            .generate_token("buyer:abc123", Role::Buyer, "shop@example.com")
            .expect("token generation");
        let claims = service.validate_token(&token).expect("token validation");

        assert_eq!(claims.sub, "buyer:abc123");
        assert_eq!(claims.role, "buyer");
        assert_eq!(claims.email, "shop@example.com");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();
        let mut token = service
            .generate_token("supplier:s1", Role::Supplier, "s@example.com")
            .unwrap();
        token.push('x');

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = test_service()
            .generate_token("buyer:b1", Role::Buyer, "b@example.com")
            .unwrap();

        let other = JwtService::with_config(JwtConfig {
            secret: "a-completely-different-32-byte-secret!!!".to_string(),
            expiration_minutes: 60,
            issuer: "market-server".to_string(),
            audience: "market-clients".to_string(),
        });
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_current_user_from_claims() {
        let service = test_service();
        let token = service
            .generate_token("supplier:s1", Role::Supplier, "s@example.com")
            .unwrap();
        let user = CurrentUser::try_from(service.validate_token(&token).unwrap()).unwrap();

        assert_eq!(user.id, "supplier:s1");
        assert!(user.is_supplier());
        assert!(!user.is_buyer());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("buyer".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("supplier".parse::<Role>().unwrap(), Role::Supplier);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("vendor".parse::<Role>().is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
