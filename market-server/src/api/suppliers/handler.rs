//! Supplier Profile Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{SupplierProfile, SupplierUpdate};
use crate::db::repository::SupplierRepository;
use crate::utils::{AppResult, ErrorCode};

/// GET /api/suppliers - 获取活跃供应商 (按评分排序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<SupplierProfile>>> {
    let repo = SupplierRepository::new(state.get_db());
    let suppliers = repo.list_active().await.map_err(AppError::from)?;
    Ok(Json(suppliers.into_iter().map(Into::into).collect()))
}

/// GET /api/suppliers/:id - 获取供应商资料
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<SupplierProfile>> {
    let repo = SupplierRepository::new(state.get_db());
    let supplier = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::SupplierNotFound))?;
    Ok(Json(supplier.into()))
}

/// PUT /api/suppliers/:id - 更新供应商资料 (仅本人)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SupplierUpdate>,
) -> AppResult<Json<SupplierProfile>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    // 只能改自己的资料
    let target = crate::db::repository::make_record_id("supplier", &id);
    if user.id != target.to_string() && !user.is_admin() {
        return Err(AppError::forbidden("Can only update own profile"));
    }

    let repo = SupplierRepository::new(state.get_db());
    let supplier = repo.update(&id, payload).await.map_err(AppError::from)?;
    Ok(Json(supplier.into()))
}
