//! Notification Model
//!
//! 每条通知只属于一个接收方；只允许接收方标记已读或删除。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::party::PartyRef;
use super::serde_helpers;

/// Notification type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderCreated,
    OrderConfirmed,
    OrderProcessing,
    OrderShipped,
    OrderDelivered,
    OrderCancelled,
    OrderRejected,
    ReservationReceived,
    ReservationAccepted,
    ReservationRejected,
    PaymentSuccessful,
    PaymentFailed,
    PaymentRefunded,
    RatingReceived,
    PriceUpdated,
    StockLow,
    General,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::OrderCreated => "order_created",
            NotificationType::OrderConfirmed => "order_confirmed",
            NotificationType::OrderProcessing => "order_processing",
            NotificationType::OrderShipped => "order_shipped",
            NotificationType::OrderDelivered => "order_delivered",
            NotificationType::OrderCancelled => "order_cancelled",
            NotificationType::OrderRejected => "order_rejected",
            NotificationType::ReservationReceived => "reservation_received",
            NotificationType::ReservationAccepted => "reservation_accepted",
            NotificationType::ReservationRejected => "reservation_rejected",
            NotificationType::PaymentSuccessful => "payment_successful",
            NotificationType::PaymentFailed => "payment_failed",
            NotificationType::PaymentRefunded => "payment_refunded",
            NotificationType::RatingReceived => "rating_received",
            NotificationType::PriceUpdated => "price_updated",
            NotificationType::StockLow => "stock_low",
            NotificationType::General => "general",
        }
    }
}

/// Notification priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub recipient: PartyRef,
    pub sender: Option<PartyRef>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_order: Option<RecordId>,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_reservation: Option<RecordId>,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub related_product: Option<RecordId>,
    #[serde(default)]
    pub read: bool,
    pub read_at: Option<i64>,
    #[serde(default)]
    pub priority: Priority,
    pub created_at: i64,
}

/// Dispatch request consumed by the notification dispatcher
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient: PartyRef,
    pub sender: Option<PartyRef>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_order: Option<RecordId>,
    pub related_reservation: Option<RecordId>,
    pub related_product: Option<RecordId>,
    pub priority: Priority,
}

impl NewNotification {
    pub fn new(
        recipient: PartyRef,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            sender: None,
            kind,
            title: title.into(),
            message: message.into(),
            related_order: None,
            related_reservation: None,
            related_product: None,
            priority: Priority::Medium,
        }
    }

    pub fn from(mut self, sender: PartyRef) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn about_order(mut self, order: RecordId) -> Self {
        self.related_order = Some(order);
        self
    }

    pub fn about_reservation(mut self, reservation: RecordId) -> Self {
        self.related_reservation = Some(reservation);
        self
    }

    pub fn about_product(mut self, product: RecordId) -> Self {
        self.related_product = Some(product);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Filter/pagination for notification listings
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotificationListQuery {
    pub unread_only: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Per-type breakdown for notification statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTypeCount {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub count: i64,
    pub unread: i64,
}

/// Notification statistics response
#[derive(Debug, Clone, Serialize)]
pub struct NotificationStatistics {
    pub total: i64,
    pub unread: i64,
    pub type_breakdown: Vec<NotificationTypeCount>,
}
