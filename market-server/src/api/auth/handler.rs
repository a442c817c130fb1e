//! Authentication Handlers
//!
//! Handles registration, login and profile lookup for both account types

use std::time::Duration;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppError;
use crate::auth::{CurrentUser, Role};
use crate::core::ServerState;
use crate::db::models::{
    Buyer, BuyerProfile, BuyerRegister, Supplier, SupplierProfile, SupplierRegister,
};
use crate::db::repository::{BuyerRepository, RepoError, SupplierRepository};
use crate::utils::{AppResult, ErrorCode};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse<T> {
    pub token: String,
    pub profile: T,
}

fn map_register_error(e: RepoError) -> AppError {
    match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::EmailExists),
        other => other.into(),
    }
}

/// POST /api/auth/buyer/register - 注册买家账号
pub async fn register_buyer(
    State(state): State<ServerState>,
    Json(payload): Json<BuyerRegister>,
) -> AppResult<Json<AuthResponse<BuyerProfile>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let now = shared::util::now_millis();
    let buyer = Buyer {
        id: None,
        shop_name: payload.shop_name.trim().to_string(),
        owner_name: payload.owner_name.trim().to_string(),
        location: payload.location.trim().to_string(),
        contact_number: payload.contact_number.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        password_hash: Buyer::hash_password(&payload.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?,
        is_active: true,
        is_verified: false,
        last_login: None,
        created_at: now,
        updated_at: now,
    };

    let repo = BuyerRepository::new(state.get_db());
    let buyer = repo.create(buyer).await.map_err(map_register_error)?;

    let id = buyer
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&id, Role::Buyer, &buyer.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(buyer = %id, "Buyer registered");

    Ok(Json(AuthResponse {
        token,
        profile: buyer.into(),
    }))
}

/// POST /api/auth/buyer/login - 买家登录
pub async fn login_buyer(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse<BuyerProfile>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = BuyerRepository::new(state.get_db());
    let buyer = repo
        .find_by_email(&payload.email.trim().to_lowercase())
        .await
        .map_err(AppError::from)?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent account enumeration
    let buyer = match buyer {
        Some(b) => {
            if !b.is_active {
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }
            let password_valid = b
                .verify_password(&payload.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
            if !password_valid {
                tracing::warn!(email = %payload.email, "Buyer login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            b
        }
        None => {
            tracing::warn!(email = %payload.email, "Buyer login failed - account not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let id = buyer
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    repo.touch_last_login(&id).await.map_err(AppError::from)?;

    let token = state
        .jwt_service
        .generate_token(&id, Role::Buyer, &buyer.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        profile: buyer.into(),
    }))
}

/// POST /api/auth/supplier/register - 注册供应商账号
pub async fn register_supplier(
    State(state): State<ServerState>,
    Json(payload): Json<SupplierRegister>,
) -> AppResult<Json<AuthResponse<SupplierProfile>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let now = shared::util::now_millis();
    let supplier = Supplier {
        id: None,
        full_name: payload.full_name.trim().to_string(),
        contact_number: payload.contact_number.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        password_hash: Supplier::hash_password(&payload.password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?,
        rating: 0.0,
        rating_count: 0,
        is_active: true,
        is_verified: false,
        last_login: None,
        created_at: now,
        updated_at: now,
    };

    let repo = SupplierRepository::new(state.get_db());
    let supplier = repo.create(supplier).await.map_err(map_register_error)?;

    let id = supplier
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let token = state
        .jwt_service
        .generate_token(&id, Role::Supplier, &supplier.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(supplier = %id, "Supplier registered");

    Ok(Json(AuthResponse {
        token,
        profile: supplier.into(),
    }))
}

/// POST /api/auth/supplier/login - 供应商登录
pub async fn login_supplier(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse<SupplierProfile>>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let repo = SupplierRepository::new(state.get_db());
    let supplier = repo
        .find_by_email(&payload.email.trim().to_lowercase())
        .await
        .map_err(AppError::from)?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let supplier = match supplier {
        Some(s) => {
            if !s.is_active {
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }
            let password_valid = s
                .verify_password(&payload.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;
            if !password_valid {
                tracing::warn!(email = %payload.email, "Supplier login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }
            s
        }
        None => {
            tracing::warn!(email = %payload.email, "Supplier login failed - account not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let id = supplier
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    repo.touch_last_login(&id).await.map_err(AppError::from)?;

    let token = state
        .jwt_service
        .generate_token(&id, Role::Supplier, &supplier.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        profile: supplier.into(),
    }))
}

/// GET /api/auth/me - 当前用户资料
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    match user.role {
        Role::Buyer => {
            let buyer = BuyerRepository::new(state.get_db())
                .find_by_id(&user.id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::new(ErrorCode::BuyerNotFound))?;
            let profile: BuyerProfile = buyer.into();
            Ok(Json(serde_json::json!({ "role": "buyer", "profile": profile })))
        }
        Role::Supplier => {
            let supplier = SupplierRepository::new(state.get_db())
                .find_by_id(&user.id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::new(ErrorCode::SupplierNotFound))?;
            let profile: SupplierProfile = supplier.into();
            Ok(Json(serde_json::json!({ "role": "supplier", "profile": profile })))
        }
        Role::Admin => Ok(Json(
            serde_json::json!({ "role": "admin", "profile": { "email": user.email } }),
        )),
    }
}
