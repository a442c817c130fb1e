//! Payment Processor Interface
//!
//! 外部支付网关的抽象：创建意向 / 查询意向 / 退款。
//! 未配置网关凭据时注入 demo 实现，下游对账逻辑不感知差异。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::{AppError, AppResult, ErrorCode};

/// External intent status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    Processing,
    Succeeded,
    Canceled,
}

/// An in-progress charge attempt at the external processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: IntentStatus,
    /// Minor units (cents)
    pub amount: i64,
    pub currency: String,
}

/// Create-intent request
#[derive(Debug, Clone, Serialize)]
pub struct CreateIntentRequest {
    /// Minor units (cents)
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    pub order_number: String,
}

/// Refund request
#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    pub intent_id: String,
    /// Minor units; None refunds the full charge
    pub amount: Option<i64>,
    pub reason: Option<String>,
}

/// Refund outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount: Option<i64>,
    pub succeeded: bool,
}

/// Opaque external payment processor
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_intent(&self, req: CreateIntentRequest) -> AppResult<PaymentIntent>;
    async fn retrieve_intent(&self, intent_id: &str) -> AppResult<PaymentIntent>;
    async fn create_refund(&self, req: RefundRequest) -> AppResult<Refund>;

    /// Demo processors have no remote source of truth; confirmation
    /// resolves against the local order record instead
    fn is_demo(&self) -> bool {
        false
    }
}

// =============================================================================
// Demo processor
// =============================================================================

/// Deterministic in-process stand-in for the external gateway
#[derive(Debug, Clone, Default)]
pub struct MockProcessor;

impl MockProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_intent(&self, req: CreateIntentRequest) -> AppResult<PaymentIntent> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let id = format!("pi_demo_{}_{}", shared::util::now_millis(), &suffix[..9]);
        Ok(PaymentIntent {
            client_secret: Some(format!("{}_secret", id)),
            id,
            status: IntentStatus::RequiresPaymentMethod,
            amount: req.amount,
            currency: req.currency,
        })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> AppResult<PaymentIntent> {
        // Demo charges always settle
        Ok(PaymentIntent {
            id: intent_id.to_string(),
            client_secret: None,
            status: IntentStatus::Succeeded,
            amount: 0,
            currency: "lkr".to_string(),
        })
    }

    async fn create_refund(&self, req: RefundRequest) -> AppResult<Refund> {
        Ok(Refund {
            id: format!("re_demo_{}", shared::util::now_millis()),
            amount: req.amount,
            succeeded: true,
        })
    }

    fn is_demo(&self) -> bool {
        true
    }
}

// =============================================================================
// HTTP gateway processor
// =============================================================================

/// Thin client for a remote intent-based gateway
pub struct HttpProcessor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpProcessor {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn gateway_error(context: &str, e: impl std::fmt::Display) -> AppError {
        AppError::with_message(ErrorCode::NetworkError, format!("{}: {}", context, e))
    }
}

#[async_trait]
impl PaymentProcessor for HttpProcessor {
    async fn create_intent(&self, req: CreateIntentRequest) -> AppResult<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "amount": req.amount,
                "currency": req.currency,
                "metadata": {
                    "order_id": req.order_id,
                    "order_number": req.order_number,
                },
            }))
            .send()
            .await
            .map_err(|e| Self::gateway_error("Create intent request failed", e))?;

        if !response.status().is_success() {
            return Err(AppError::with_message(
                ErrorCode::PaymentFailed,
                format!("Gateway rejected intent creation: {}", response.status()),
            ));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| Self::gateway_error("Malformed intent response", e))
    }

    async fn retrieve_intent(&self, intent_id: &str) -> AppResult<PaymentIntent> {
        let url = format!("{}/v1/payment_intents/{}", self.base_url, intent_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Self::gateway_error("Retrieve intent request failed", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::new(ErrorCode::PaymentIntentNotFound));
        }
        if !response.status().is_success() {
            return Err(AppError::with_message(
                ErrorCode::PaymentFailed,
                format!("Gateway rejected intent lookup: {}", response.status()),
            ));
        }

        response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| Self::gateway_error("Malformed intent response", e))
    }

    async fn create_refund(&self, req: RefundRequest) -> AppResult<Refund> {
        let url = format!("{}/v1/refunds", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "payment_intent": req.intent_id,
                "amount": req.amount,
                "reason": req.reason,
            }))
            .send()
            .await
            .map_err(|e| Self::gateway_error("Refund request failed", e))?;

        if !response.status().is_success() {
            return Err(AppError::with_message(
                ErrorCode::PaymentFailed,
                format!("Gateway rejected refund: {}", response.status()),
            ));
        }

        response
            .json::<Refund>()
            .await
            .map_err(|e| Self::gateway_error("Malformed refund response", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_intent_shape() {
        let processor = MockProcessor::new();
        let intent = processor
            .create_intent(CreateIntentRequest {
                amount: 250_000,
                currency: "lkr".to_string(),
                order_id: "order:o1".to_string(),
                order_number: "ORD-1-0001".to_string(),
            })
            .await
            .unwrap();

        assert!(intent.id.starts_with("pi_demo_"));
        assert!(intent.client_secret.as_ref().unwrap().ends_with("_secret"));
        assert_eq!(intent.status, IntentStatus::RequiresPaymentMethod);
        assert_eq!(intent.amount, 250_000);
        assert!(processor.is_demo());
    }

    #[tokio::test]
    async fn test_mock_intents_are_unique() {
        let processor = MockProcessor::new();
        let req = CreateIntentRequest {
            amount: 100,
            currency: "lkr".to_string(),
            order_id: "order:o1".to_string(),
            order_number: "ORD-1-0001".to_string(),
        };
        let a = processor.create_intent(req.clone()).await.unwrap();
        let b = processor.create_intent(req).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_mock_refund_succeeds() {
        let processor = MockProcessor::new();
        let refund = processor
            .create_refund(RefundRequest {
                intent_id: "pi_demo_1".to_string(),
                amount: None,
                reason: None,
            })
            .await
            .unwrap();
        assert!(refund.succeeded);
    }
}
