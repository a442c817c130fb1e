//! Notification API Handlers
//!
//! 读/删都要求调用者就是接收方本人。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    Notification, NotificationListQuery, NotificationStatistics, PartyRef,
};
use crate::db::repository::NotificationRepository;
use crate::utils::{AppResult, ErrorCode};
use shared::response::Pagination;

#[derive(Debug, Serialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
    pub unread_count: u64,
}

/// GET /api/notifications - 本人通知列表 (新者在前)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<NotificationListQuery>,
) -> AppResult<Json<NotificationPage>> {
    let recipient = PartyRef::from_user(&user)?;
    let repo = NotificationRepository::new(state.get_db());

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let (notifications, total) = repo
        .list_for_recipient(
            &recipient,
            query.unread_only.unwrap_or(false),
            query.kind,
            page,
            limit,
        )
        .await
        .map_err(AppError::from)?;
    let unread_count = repo.unread_count(&recipient).await.map_err(AppError::from)?;

    Ok(Json(NotificationPage {
        notifications,
        pagination: Pagination::new(page, limit, total),
        unread_count,
    }))
}

/// 检查通知属于当前用户
async fn load_owned(
    repo: &NotificationRepository,
    id: &str,
    user: &CurrentUser,
) -> AppResult<Notification> {
    let notification = repo
        .find_by_id(id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::new(ErrorCode::NotificationNotFound))?;

    let recipient = PartyRef::from_user(user)?;
    if !notification.recipient.same_party(&recipient) {
        return Err(AppError::forbidden("Access denied"));
    }
    Ok(notification)
}

/// PUT /api/notifications/:id/read - 标记已读 (幂等)
pub async fn mark_as_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Notification>> {
    let repo = NotificationRepository::new(state.get_db());
    load_owned(&repo, &id, &user).await?;

    let notification = repo.mark_as_read(&id).await.map_err(AppError::from)?;
    Ok(Json(notification))
}

/// PUT /api/notifications/read-all - 全部标记已读 (幂等)
pub async fn mark_all_as_read(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let recipient = PartyRef::from_user(&user)?;
    let repo = NotificationRepository::new(state.get_db());
    let updated = repo
        .mark_all_as_read(&recipient)
        .await
        .map_err(AppError::from)?;
    Ok(Json(serde_json::json!({ "marked_read": updated })))
}

/// DELETE /api/notifications/:id - 删除 (仅接收方)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = NotificationRepository::new(state.get_db());
    load_owned(&repo, &id, &user).await?;

    repo.delete(&id).await.map_err(AppError::from)?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// GET /api/notifications/statistics - 本人通知统计
pub async fn statistics(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<NotificationStatistics>> {
    let recipient = PartyRef::from_user(&user)?;
    let repo = NotificationRepository::new(state.get_db());

    let type_breakdown = repo
        .type_breakdown(&recipient)
        .await
        .map_err(AppError::from)?;
    let total = repo.total_count(&recipient).await.map_err(AppError::from)?;
    let unread = repo.unread_count(&recipient).await.map_err(AppError::from)?;

    Ok(Json(NotificationStatistics {
        total: total as i64,
        unread: unread as i64,
        type_breakdown,
    }))
}
