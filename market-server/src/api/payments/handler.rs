//! Payment API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, PartyRef, PaymentStatus};
use crate::orders::OrderWorkflow;
use crate::payments::{
    IntentResponse, PaymentConfirmation, PaymentService, RefundResponse, WebhookAck,
};
use crate::utils::AppResult;
use shared::response::PaginatedResponse;

/// webhook 签名头
const SIGNATURE_HEADER: &str = "x-webhook-signature";

fn service(state: &ServerState) -> PaymentService {
    PaymentService::new(
        state.get_db(),
        state.payment_processor.clone(),
        state.config.payment_webhook_secret.clone(),
    )
}

#[derive(Debug, Deserialize)]
pub struct CreateIntentBody {
    pub order_id: String,
    pub amount: Option<f64>,
}

/// POST /api/payments/intent - 为订单创建支付意向
pub async fn create_intent(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateIntentBody>,
) -> AppResult<Json<IntentResponse>> {
    let intent = service(&state)
        .create_intent(&payload.order_id, payload.amount, &user)
        .await?;
    Ok(Json(intent))
}

#[derive(Debug, Deserialize)]
pub struct ConfirmBody {
    pub intent_id: String,
}

/// POST /api/payments/confirm - 按意向 id 确认支付
pub async fn confirm(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Json(payload): Json<ConfirmBody>,
) -> AppResult<Json<PaymentConfirmation>> {
    let confirmation = service(&state).confirm(&payload.intent_id).await?;
    Ok(Json(confirmation))
}

#[derive(Debug, Deserialize)]
pub struct RefundBody {
    pub amount: Option<f64>,
    pub reason: Option<String>,
}

/// POST /api/payments/:order_id/refund - 供应商发起退款
pub async fn refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    Json(payload): Json<RefundBody>,
) -> AppResult<Json<RefundResponse>> {
    let refund = service(&state)
        .refund(&order_id, payload.amount, payload.reason, &user)
        .await?;
    Ok(Json(refund))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<PaymentStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/payments/history - 本方已结算支付记录
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<PaginatedResponse<Order>>> {
    let actor_ref = PartyRef::from_user(&user)?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let workflow = OrderWorkflow::new(state.get_db());
    let orders = workflow
        .repo()
        .list_payment_history(
            OrderWorkflow::side_for(&user),
            &actor_ref.id_string(),
            query.status,
            page,
            limit,
        )
        .await
        .map_err(AppError::from)?;

    let total = orders.len() as u64;
    Ok(Json(PaginatedResponse::new(orders, page, limit, total)))
}

/// POST /api/payments/webhook - 处理器异步回调
///
/// 原始 body 参与签名验证，必须在 JSON 解析之前完成
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let ack = service(&state).handle_webhook(&body, signature).await?;
    Ok(Json(ack))
}
