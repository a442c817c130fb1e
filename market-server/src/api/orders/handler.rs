//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderListQuery, OrderStatistics, OrderStatusUpdate, PartyRef};
use crate::orders::OrderWorkflow;
use crate::utils::AppResult;
use shared::response::PaginatedResponse;

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let workflow = OrderWorkflow::new(state.get_db());
    let order = workflow.create_order(&user, payload).await?;
    Ok(Json(order))
}

/// GET /api/orders - 按角色列出本方订单
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    let workflow = OrderWorkflow::new(state.get_db());
    let actor_ref = PartyRef::from_user(&user)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let (orders, total) = workflow
        .repo()
        .list_for_party(
            OrderWorkflow::side_for(&user),
            &actor_ref.id_string(),
            query.status,
            page,
            limit,
        )
        .await
        .map_err(AppError::from)?;

    Ok(Json(PaginatedResponse::new(orders, page, limit, total)))
}

/// GET /api/orders/statistics - 本方订单统计
pub async fn statistics(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<OrderStatistics>> {
    let workflow = OrderWorkflow::new(state.get_db());
    let stats = workflow.statistics(&user).await?;
    Ok(Json(stats))
}

/// GET /api/orders/:id - 获取单个订单 (仅参与双方)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let workflow = OrderWorkflow::new(state.get_db());
    let order = workflow.get_order(&id, &user).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/status - 状态转移
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let workflow = OrderWorkflow::new(state.get_db());
    let order = workflow.update_status(&id, payload, &user).await?;
    Ok(Json(order))
}
