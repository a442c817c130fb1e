//! Webhook Event Ledger
//!
//! 已处理事件 id 的持久去重账本；event_id 唯一索引保证幂等。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Processed webhook event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub event_id: String,
    pub event_type: String,
    /// epoch millis
    pub received_at: i64,
}
