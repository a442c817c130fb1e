//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Order, Reservation, ReservationCreate, ReservationResponse, ReservationStatistics,
};
use crate::reservations::ReservationWorkflow;
use crate::utils::AppResult;

/// POST /api/reservations - 创建预订
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Json<Reservation>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let workflow = ReservationWorkflow::new(state.get_db());
    let reservation = workflow.create(&user, payload).await?;
    Ok(Json(reservation))
}

/// GET /api/reservations/shop - 本店收到的预订
pub async fn list_for_shop(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Reservation>>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let reservations = workflow.list_for_shop(&user).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/by-mobile/:mobile - 按请求方手机号查询
pub async fn list_by_mobile(
    State(state): State<ServerState>,
    Path(mobile): Path<String>,
) -> AppResult<Json<Vec<Reservation>>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let reservations = workflow.list_by_mobile(&mobile).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/statistics - 本店预订统计
pub async fn statistics(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ReservationStatistics>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let stats = workflow.statistics(&user).await?;
    Ok(Json(stats))
}

/// GET /api/reservations/:id - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let reservation = workflow.get(&id).await?;
    Ok(Json(reservation))
}

/// PUT /api/reservations/:id/accept - 店铺接受预订 (可附带还盘)
pub async fn accept(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReservationResponse>,
) -> AppResult<Json<Reservation>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let reservation = workflow.accept(&id, &user, payload).await?;
    Ok(Json(reservation))
}

/// PUT /api/reservations/:id/reject - 店铺拒绝预订
pub async fn reject(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReservationResponse>,
) -> AppResult<Json<Reservation>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let reservation = workflow.reject(&id, &user, payload).await?;
    Ok(Json(reservation))
}

/// PUT /api/reservations/:id/cancel - 请求方撤回
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Reservation>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let reservation = workflow.cancel(&id).await?;
    Ok(Json(reservation))
}

/// POST /api/reservations/:id/convert - 转换为订单 (一次性)
pub async fn convert_to_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let order = workflow.convert_to_order(&id, &user).await?;
    Ok(Json(order))
}

/// POST /api/reservations/expire - 批量过期清扫
///
/// 由外部调度器周期性调用
pub async fn expire_sweep(
    State(state): State<ServerState>,
    _user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let workflow = ReservationWorkflow::new(state.get_db());
    let expired = workflow.expire_old().await?;
    Ok(Json(serde_json::json!({ "expired": expired })))
}
