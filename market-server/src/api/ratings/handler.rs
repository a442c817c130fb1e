//! Rating API Handlers
//!
//! 同一 rater/ratee(/order) 组合只允许一条评分；禁止给自己评分。
//! 评给供应商的分同时折入其聚合评分。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    NewNotification, NotificationType, PartyKind, PartyRef, Rating, RatingCreate, RatingSummary,
};
use crate::db::repository::{
    RatingRepository, RepoError, SupplierRepository, make_record_id,
};
use crate::notify::NotificationDispatcher;
use crate::utils::{AppResult, ErrorCode};

fn parse_kind(kind: &str) -> AppResult<PartyKind> {
    match kind {
        "buyer" => Ok(PartyKind::Buyer),
        "supplier" => Ok(PartyKind::Supplier),
        other => Err(AppError::validation(format!(
            "Unknown party kind: {}",
            other
        ))),
    }
}

/// POST /api/ratings - 提交评分
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<RatingCreate>,
) -> AppResult<Json<Rating>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::new(ErrorCode::RatingOutOfRange));
    }

    let rater = PartyRef::from_user(&user)?;
    let ratee = PartyRef {
        kind: payload.ratee_kind,
        id: make_record_id(payload.ratee_kind.table(), &payload.ratee_id),
    };

    if rater.same_party(&ratee) {
        return Err(AppError::new(ErrorCode::RatingSelfForbidden));
    }

    let related_order = payload
        .order_id
        .as_deref()
        .map(|id| make_record_id("order", id));

    let rating = Rating {
        id: None,
        unique_key: Rating::compose_key(&rater, &ratee, related_order.as_ref()),
        rater: rater.clone(),
        ratee: ratee.clone(),
        rating: payload.rating,
        comment: payload.comment.unwrap_or_default(),
        related_order,
        categories: payload.categories,
        verified: true,
        created_at: shared::util::now_millis(),
    };

    let repo = RatingRepository::new(state.get_db());
    let rating = repo.create(rating).await.map_err(|e| match e {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::RatingDuplicate),
        other => other.into(),
    })?;

    // 供应商聚合评分跟着更新
    if ratee.kind == PartyKind::Supplier {
        let suppliers = SupplierRepository::new(state.get_db());
        if let Err(e) = suppliers
            .apply_rating(&ratee.id_string(), rating.rating)
            .await
        {
            tracing::warn!(error = %e, "Failed to fold rating into supplier aggregate");
        }
    }

    let _ = NotificationDispatcher::new(state.get_db())
        .dispatch(
            NewNotification::new(
                ratee,
                NotificationType::RatingReceived,
                "New Rating Received",
                format!("You received a {}-star rating", rating.rating),
            )
            .from(rater),
        )
        .await;

    Ok(Json(rating))
}

/// GET /api/ratings/summary/:kind/:id - 聚合评分视图
pub async fn summary(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, String)>,
) -> AppResult<Json<RatingSummary>> {
    let kind = parse_kind(&kind)?;
    let ratee = PartyRef {
        kind,
        id: make_record_id(kind.table(), &id),
    };

    let repo = RatingRepository::new(state.get_db());
    let summary = repo
        .summary_for_ratee(&ratee)
        .await
        .map_err(AppError::from)?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<u32>,
}

/// GET /api/ratings/recent/:kind/:id - 最近收到的评分
pub async fn recent(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, String)>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<Rating>>> {
    let kind = parse_kind(&kind)?;
    let ratee = PartyRef {
        kind,
        id: make_record_id(kind.table(), &id),
    };

    let repo = RatingRepository::new(state.get_db());
    let ratings = repo
        .list_for_ratee(&ratee, query.limit.unwrap_or(10).clamp(1, 50))
        .await
        .map_err(AppError::from)?;
    Ok(Json(ratings))
}
