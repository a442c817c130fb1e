//! 支付对账
//!
//! 支付意向生命周期：创建意向 → 确认/失败 → 退款，
//! 以及来自外部处理器的异步 webhook 回调。
//!
//! 订单状态只在 pending → confirmed 这一步被支付路径推进；
//! 其余订单状态仍然只走订单状态机。

pub mod processor;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{CurrentUser, Role};
use crate::db::models::{
    NewNotification, NotificationType, Order, OrderStatus, PartyRef, PaymentStatus, Priority,
    StatusEntry,
};
use crate::db::repository::{OrderRepository, WebhookEventRepository};
use crate::notify::NotificationDispatcher;
use crate::utils::{AppError, AppResult, ErrorCode};
use self::processor::{CreateIntentRequest, IntentStatus, PaymentProcessor, RefundRequest};

/// Response shape for intent creation
#[derive(Debug, Clone, Serialize)]
pub struct IntentResponse {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: IntentStatus,
}

/// Response shape for payment confirmation
#[derive(Debug, Clone, Serialize)]
pub struct PaymentConfirmation {
    pub intent_id: String,
    pub order_number: String,
    pub amount: f64,
    pub status: String,
}

/// Response shape for refunds
#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    pub refund_id: String,
    pub order_number: String,
    pub status: String,
}

/// Webhook acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

/// Incoming webhook event (processor-shaped)
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub object: WebhookIntent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookIntent {
    pub id: String,
    /// Minor units
    pub amount: Option<i64>,
}

/// Compute the webhook signature for a raw body:
/// `hex(sha256("<secret>." + body))`
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(body);
    hex::encode(hasher.finalize())
}

/// Payment reconciliation service
#[derive(Clone)]
pub struct PaymentService {
    orders: OrderRepository,
    webhook_events: WebhookEventRepository,
    notifier: NotificationDispatcher,
    processor: Arc<dyn PaymentProcessor>,
    webhook_secret: Option<String>,
}

impl PaymentService {
    pub fn new(
        db: Surreal<Db>,
        processor: Arc<dyn PaymentProcessor>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            webhook_events: WebhookEventRepository::new(db.clone()),
            notifier: NotificationDispatcher::new(db),
            processor,
            webhook_secret,
        }
    }

    /// Create a payment intent against an order
    ///
    /// 只有买方可以发起；已完成的支付不能再次创建意向。
    pub async fn create_intent(
        &self,
        order_id: &str,
        amount: Option<f64>,
        actor: &CurrentUser,
    ) -> AppResult<IntentResponse> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let actor_ref = PartyRef::from_user(actor)?;
        if actor.role != Role::Buyer || order.buyer != actor_ref.id {
            return Err(AppError::forbidden("Access denied"));
        }

        if order.payment.status == PaymentStatus::Completed {
            return Err(AppError::new(ErrorCode::OrderAlreadyPaid));
        }

        let amount = amount.unwrap_or(order.total_amount);
        let intent = self
            .processor
            .create_intent(CreateIntentRequest {
                amount: (amount * 100.0).round() as i64,
                currency: "lkr".to_string(),
                order_id: order
                    .id
                    .as_ref()
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                order_number: order.order_number.clone(),
            })
            .await?;

        order.payment.intent_id = Some(intent.id.clone());
        order.payment.status = PaymentStatus::Processing;
        order.updated_at = shared::util::now_millis();
        self.orders.save(order).await.map_err(AppError::from)?;

        Ok(IntentResponse {
            id: intent.id,
            client_secret: intent.client_secret,
            status: intent.status,
        })
    }

    /// Confirm a payment by intent id
    ///
    /// Demo 模式直接按本地订单结算；配置了网关时先查询意向状态。
    /// 成功：支付置 completed，订单仍为 pending 时推进到 confirmed，
    /// 通知供应商。失败：支付置 failed，通知买方，订单状态不动。
    pub async fn confirm(&self, intent_id: &str) -> AppResult<PaymentConfirmation> {
        let order = self
            .orders
            .find_by_intent_id(intent_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        if self.processor.is_demo() {
            // 本地即是事实来源
            let paid = order.total_amount;
            let order = self
                .settle_success(order, paid, intent_id.to_string())
                .await?;
            return Ok(PaymentConfirmation {
                intent_id: intent_id.to_string(),
                order_number: order.order_number,
                amount: paid,
                status: "succeeded".to_string(),
            });
        }

        let intent = self.processor.retrieve_intent(intent_id).await?;
        match intent.status {
            IntentStatus::Succeeded => {
                let paid = if intent.amount > 0 {
                    intent.amount as f64 / 100.0
                } else {
                    order.total_amount
                };
                let order = self
                    .settle_success(order, paid, intent.id.clone())
                    .await?;
                Ok(PaymentConfirmation {
                    intent_id: intent.id,
                    order_number: order.order_number,
                    amount: paid,
                    status: "succeeded".to_string(),
                })
            }
            IntentStatus::RequiresPaymentMethod => {
                self.settle_failure(order).await?;
                Err(AppError::with_message(
                    ErrorCode::PaymentFailed,
                    "Payment failed - requires payment method",
                ))
            }
            other => Ok(PaymentConfirmation {
                intent_id: intent.id,
                order_number: order.order_number,
                amount: 0.0,
                status: format!("{:?}", other).to_lowercase(),
            }),
        }
    }

    /// Refund a completed payment
    ///
    /// 只有订单供应商可以发起；成功后支付置 refunded、订单置 cancelled。
    pub async fn refund(
        &self,
        order_id: &str,
        amount: Option<f64>,
        reason: Option<String>,
        actor: &CurrentUser,
    ) -> AppResult<RefundResponse> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let actor_ref = PartyRef::from_user(actor)?;
        if actor.role != Role::Supplier || order.supplier != actor_ref.id {
            return Err(AppError::forbidden("Access denied"));
        }

        if order.payment.status != PaymentStatus::Completed {
            return Err(AppError::with_message(
                ErrorCode::PaymentNotCompleted,
                "Cannot refund incomplete payment",
            ));
        }

        let intent_id = order
            .payment
            .intent_id
            .clone()
            .ok_or_else(|| AppError::new(ErrorCode::PaymentIntentNotFound))?;

        let refund = self
            .processor
            .create_refund(RefundRequest {
                intent_id,
                amount: amount.map(|a| (a * 100.0).round() as i64),
                reason,
            })
            .await?;

        if !refund.succeeded {
            return Err(AppError::with_message(
                ErrorCode::PaymentFailed,
                "Refund failed",
            ));
        }

        let now = shared::util::now_millis();
        order.payment.status = PaymentStatus::Refunded;
        order.status = OrderStatus::Cancelled;
        order.status_history.push(StatusEntry {
            status: OrderStatus::Cancelled,
            timestamp: now,
            actor: Some(actor_ref.clone()),
            notes: Some("Payment refunded".to_string()),
        });
        order.updated_at = now;
        let order = self.orders.save(order).await.map_err(AppError::from)?;

        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(
                    PartyRef::buyer(order.buyer.clone()),
                    NotificationType::PaymentRefunded,
                    "Payment Refunded",
                    format!("Refund processed for order {}", order.order_number),
                )
                .from(actor_ref)
                .with_priority(Priority::High)
                .about_order(order.id.clone().unwrap_or_else(|| {
                    surrealdb::RecordId::from_table_key("order", "unknown")
                })),
            )
            .await;

        Ok(RefundResponse {
            refund_id: refund.id,
            order_number: order.order_number,
            status: "succeeded".to_string(),
        })
    }

    /// Handle an asynchronous webhook delivery
    ///
    /// 签名验证失败一律拒绝（fail closed），任何状态变更之前执行。
    /// 事件 id 先落账本；重复投递只回执不再处理。
    pub async fn handle_webhook(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> AppResult<WebhookAck> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or_else(|| AppError::new(ErrorCode::WebhookSignatureInvalid))?;
        let signature = signature.ok_or_else(|| {
            AppError::new(ErrorCode::WebhookSignatureInvalid)
        })?;

        let expected = compute_signature(secret, body);
        if !signature.eq_ignore_ascii_case(&expected) {
            tracing::warn!("Webhook signature verification failed");
            return Err(AppError::new(ErrorCode::WebhookSignatureInvalid));
        }

        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|e| AppError::validation(format!("Malformed webhook payload: {}", e)))?;

        // Durable dedup: a redelivered event id is acknowledged and skipped
        let fresh = self
            .webhook_events
            .record(&payload.id, &payload.event_type)
            .await
            .map_err(AppError::from)?;
        if !fresh {
            tracing::debug!(event_id = %payload.id, "Duplicate webhook delivery skipped");
            return Ok(WebhookAck {
                received: true,
                duplicate: true,
            });
        }

        match payload.event_type.as_str() {
            "payment_intent.succeeded" => {
                self.webhook_succeeded(&payload.data.object).await?;
            }
            "payment_intent.payment_failed" => {
                self.webhook_failed(&payload.data.object).await?;
            }
            "payment_intent.canceled" => {
                self.webhook_canceled(&payload.data.object).await?;
            }
            other => {
                tracing::debug!(event_type = %other, "Unhandled webhook event type");
            }
        }

        Ok(WebhookAck {
            received: true,
            duplicate: false,
        })
    }

    // ========== Webhook handlers ==========
    // 每个 handler 在变更前重查当前支付状态，容忍重复投递

    async fn webhook_succeeded(&self, intent: &WebhookIntent) -> AppResult<()> {
        let Some(order) = self
            .orders
            .find_by_intent_id(&intent.id)
            .await
            .map_err(AppError::from)?
        else {
            tracing::warn!(intent_id = %intent.id, "Webhook for unknown intent");
            return Ok(());
        };

        if order.payment.status == PaymentStatus::Completed {
            return Ok(());
        }

        let paid = intent
            .amount
            .map(|a| a as f64 / 100.0)
            .unwrap_or(order.total_amount);
        self.settle_success(order, paid, intent.id.clone()).await?;
        Ok(())
    }

    async fn webhook_failed(&self, intent: &WebhookIntent) -> AppResult<()> {
        let Some(order) = self
            .orders
            .find_by_intent_id(&intent.id)
            .await
            .map_err(AppError::from)?
        else {
            return Ok(());
        };

        if matches!(
            order.payment.status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            return Ok(());
        }

        self.settle_failure(order).await?;
        Ok(())
    }

    async fn webhook_canceled(&self, intent: &WebhookIntent) -> AppResult<()> {
        let Some(mut order) = self
            .orders
            .find_by_intent_id(&intent.id)
            .await
            .map_err(AppError::from)?
        else {
            return Ok(());
        };

        if matches!(
            order.payment.status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            return Ok(());
        }

        order.payment.status = PaymentStatus::Cancelled;
        order.updated_at = shared::util::now_millis();
        self.orders.save(order).await.map_err(AppError::from)?;
        Ok(())
    }

    // ========== Settlement ==========

    /// Mark the payment completed; advance pending orders to confirmed
    async fn settle_success(
        &self,
        mut order: Order,
        paid_amount: f64,
        transaction_id: String,
    ) -> AppResult<Order> {
        let now = shared::util::now_millis();
        order.payment.status = PaymentStatus::Completed;
        order.payment.paid_amount = Some(paid_amount);
        order.payment.payment_date = Some(now);
        order.payment.transaction_id = Some(transaction_id);

        // 只有仍在 pending 的订单被推进到 confirmed
        if order.status == OrderStatus::Pending {
            order.status = OrderStatus::Confirmed;
            order.status_history.push(StatusEntry {
                status: OrderStatus::Confirmed,
                timestamp: now,
                actor: None,
                notes: Some("Payment completed".to_string()),
            });
        }
        order.updated_at = now;

        let order = self.orders.save(order).await.map_err(AppError::from)?;

        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(
                    PartyRef::supplier(order.supplier.clone()),
                    NotificationType::PaymentSuccessful,
                    "Payment Received",
                    format!(
                        "Payment of LKR {:.2} received for order {}",
                        paid_amount, order.order_number
                    ),
                )
                .from(PartyRef::buyer(order.buyer.clone()))
                .with_priority(Priority::High)
                .about_order(order.id.clone().unwrap_or_else(|| {
                    surrealdb::RecordId::from_table_key("order", "unknown")
                })),
            )
            .await;

        Ok(order)
    }

    /// Mark the payment failed; order status is untouched
    async fn settle_failure(&self, mut order: Order) -> AppResult<Order> {
        order.payment.status = PaymentStatus::Failed;
        order.updated_at = shared::util::now_millis();
        let order = self.orders.save(order).await.map_err(AppError::from)?;

        let _ = self
            .notifier
            .dispatch(
                NewNotification::new(
                    PartyRef::buyer(order.buyer.clone()),
                    NotificationType::PaymentFailed,
                    "Payment Failed",
                    format!(
                        "Payment failed for order {}. Please try again.",
                        order.order_number
                    ),
                )
                .with_priority(Priority::High)
                .about_order(order.id.clone().unwrap_or_else(|| {
                    surrealdb::RecordId::from_table_key("order", "unknown")
                })),
            )
            .await;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let secret = "whsec_test";
        let body = br#"{"id":"evt_1","type":"payment_intent.succeeded"}"#;
        let sig = compute_signature(secret, body);

        assert_eq!(sig.len(), 64);
        assert_eq!(sig, compute_signature(secret, body));
    }

    #[test]
    fn test_signature_depends_on_secret_and_body() {
        let body = b"payload";
        assert_ne!(
            compute_signature("secret-a", body),
            compute_signature("secret-b", body)
        );
        assert_ne!(
            compute_signature("secret-a", b"payload"),
            compute_signature("secret-a", b"payload2")
        );
    }

    #[test]
    fn test_webhook_payload_parse() {
        let body = r#"{
            "id": "evt_123",
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_abc", "amount": 2500000 } }
        }"#;
        let payload: WebhookPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.id, "evt_123");
        assert_eq!(payload.event_type, "payment_intent.succeeded");
        assert_eq!(payload.data.object.id, "pi_abc");
        assert_eq!(payload.data.object.amount, Some(2500000));
    }
}
