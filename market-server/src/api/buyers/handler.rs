//! Buyer Profile Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{BuyerProfile, BuyerUpdate};
use crate::db::repository::BuyerRepository;
use crate::utils::{AppResult, ErrorCode};

/// GET /api/buyers/:id - 获取买家资料
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<BuyerProfile>> {
    let repo = BuyerRepository::new(state.get_db());
    let buyer = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::BuyerNotFound))?;
    Ok(Json(buyer.into()))
}

/// PUT /api/buyers/:id - 更新买家资料 (仅本人)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<BuyerUpdate>,
) -> AppResult<Json<BuyerProfile>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    // 只能改自己的资料
    let target = crate::db::repository::make_record_id("buyer", &id);
    if user.id != target.to_string() && !user.is_admin() {
        return Err(AppError::forbidden("Can only update own profile"));
    }

    let repo = BuyerRepository::new(state.get_db());
    let buyer = repo.update(&id, payload).await.map_err(AppError::from)?;
    Ok(Json(buyer.into()))
}
